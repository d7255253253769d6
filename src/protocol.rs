//! Wire protocol.
//!
//! Messages are JSON objects discriminated by a `type` field, modeled
//! as closed tagged enums so dispatch is exhaustive and unknown tags
//! fail deserialization instead of falling through.

use serde::{Deserialize, Serialize};

use crate::gesture::DetectionResult;

/// Messages a client may send.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One encoded video frame; runs the pipeline and broadcasts the
    /// result to every connected client.
    VideoFrame { frame: String },
    /// Mutate the shared stability threshold, effective on the next
    /// processed frame.
    UpdateSettings { stability_frames: u32 },
    /// Connectivity check; answered directly to the sender only.
    TestMessage { message: String },
}

/// Messages the server sends.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Fan-out detection event.
    GestureDetection { data: DetectionResult },
    /// Unicast reply to a `test_message`.
    TestResponse { message: String, timestamp: f64 },
}

impl ClientMessage {
    /// Parse an inbound text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_video_frame() {
        let msg =
            ClientMessage::parse(r#"{"type":"video_frame","frame":"data:image/jpeg;base64,AA=="}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::VideoFrame {
                frame: "data:image/jpeg;base64,AA==".to_string()
            }
        );
    }

    #[test]
    fn parses_update_settings() {
        let msg =
            ClientMessage::parse(r#"{"type":"update_settings","stability_frames":5}"#).unwrap();
        assert_eq!(msg, ClientMessage::UpdateSettings { stability_frames: 5 });
    }

    #[test]
    fn parses_test_message() {
        let msg = ClientMessage::parse(r#"{"type":"test_message","message":"ping"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::TestMessage {
                message: "ping".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_type_tag() {
        assert!(ClientMessage::parse(r#"{"type":"shutdown"}"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ClientMessage::parse("{not json").is_err());
    }

    #[test]
    fn gesture_detection_wire_shape() {
        let msg = ServerMessage::GestureDetection {
            data: DetectionResult {
                hand_detected: true,
                fist_detected: false,
                confidence: 0.6,
                ..DetectionResult::default()
            },
        };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "gesture_detection");
        assert_eq!(json["data"]["hand_detected"], true);
        assert_eq!(json["data"]["fist_detected"], false);
        assert!(json["data"]["landmarks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_response_wire_shape() {
        let msg = ServerMessage::TestResponse {
            message: "pong".to_string(),
            timestamp: 1700000000.25,
        };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "test_response");
        assert_eq!(json["message"], "pong");
        assert!(json["timestamp"].as_f64().unwrap() > 1.0e9);
    }
}
