//! Gesture detection/broadcast server.
//!
//! The core is a detect→stabilize→broadcast pipeline: clients stream
//! encoded video frames over a persistent WebSocket connection, an
//! external landmark estimator derives a 21-point hand pose per frame,
//! a pure classifier decides fist / not-fist, a hysteresis stabilizer
//! debounces the noisy per-frame signal, and the result is fanned out
//! to every connected subscriber.
//!
//! # Module structure
//!
//! - `frame`: inbound data-URL frame decoding and downsampling
//! - `estimate`: landmark estimator seam and backends
//! - `gesture`: classifier, stabilizer, and the shared pipeline
//! - `protocol`: typed wire messages
//! - `server`: WebSocket accept loop, client registry, broadcaster
//! - `config`: daemon configuration
//!
//! # Shared detection state
//!
//! The stabilizer counters are process-wide: frames from every
//! connection feed one logical observation sequence, serialized by a
//! mutex around the pipeline. This mirrors the single-camera,
//! single-operator deployment the server is built for; per-connection
//! isolation is an explicit non-goal.

pub mod config;
pub mod estimate;
pub mod frame;
pub mod gesture;
pub mod protocol;
pub mod server;

pub use config::GesturedConfig;
pub use estimate::{
    select_estimator, HandEstimator, HandObservation, Landmark, StubEstimator, StubPosture,
    LANDMARK_COUNT,
};
pub use frame::{decode_frame, DecodedFrame};
pub use gesture::{classify, DetectionPipeline, DetectionResult, Stabilizer};
pub use protocol::{ClientMessage, ServerMessage};
pub use server::{ClientRegistry, ClientSink, GestureServer, ServerHandle};
