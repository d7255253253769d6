use serde::{Deserialize, Serialize};

use crate::estimate::Landmark;

/// Result of running the full pipeline on one frame.
///
/// Transient: constructed per processed frame, serialized into the
/// broadcast message, then discarded. Never persisted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Was a hand observed in this frame?
    pub hand_detected: bool,
    /// Hysteresis-stabilized fist signal.
    pub fist_detected: bool,
    /// 0.95 stable fist, 0.6 hand present, 0.0 no hand.
    pub confidence: f32,
    /// All 21 landmarks when a hand was observed, empty otherwise.
    pub landmarks: Vec<Landmark>,
    /// Human-readable classification summary.
    pub debug_info: String,
    /// Current consecutive-fist run length.
    pub consecutive_frames: u32,
    /// Current consecutive-no-fist run length.
    pub no_fist_frames: u32,
}
