mod mediapipe;
mod stub;

pub use mediapipe::MediapipeEstimator;
pub use stub::{synthetic_fist, synthetic_open_hand, StubEstimator, StubPosture};
