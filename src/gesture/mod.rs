//! Gesture classification and temporal stabilization.

mod classifier;
mod pipeline;
mod result;
mod stabilizer;

pub use classifier::classify;
pub use pipeline::DetectionPipeline;
pub use result::DetectionResult;
pub use stabilizer::{
    StabilityReport, Stabilizer, DEFAULT_REQUIRED_FIST_FRAMES, DEFAULT_REQUIRED_NO_FIST_FRAMES,
};
