//! Hand landmark estimation seam.
//!
//! The server treats the landmark estimator as an external
//! collaborator behind the [`HandEstimator`] trait: a downsampled RGB
//! frame goes in, zero or one 21-landmark hand observation comes out.

mod backend;
mod backends;
mod observation;

use std::path::PathBuf;

use anyhow::{anyhow, Result};

pub use backend::HandEstimator;
pub use backends::{synthetic_fist, synthetic_open_hand, MediapipeEstimator, StubEstimator, StubPosture};
pub use observation::{landmark_index, HandObservation, Landmark, LANDMARK_COUNT};

/// Estimator backend settings, normally sourced from [`crate::config`].
#[derive(Clone, Debug)]
pub struct EstimatorSettings {
    /// Backend name: `stub` or `mediapipe`.
    pub backend: String,
    /// Interpreter for the mediapipe helper (e.g. `python3`).
    pub command: String,
    /// Path to the mediapipe helper script.
    pub script: Option<PathBuf>,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            backend: "stub".to_string(),
            command: "python3".to_string(),
            script: None,
        }
    }
}

/// Build the configured estimator backend.
pub fn select_estimator(settings: &EstimatorSettings) -> Result<Box<dyn HandEstimator>> {
    match settings.backend.as_str() {
        "stub" => Ok(Box::new(StubEstimator::no_hand())),
        "mediapipe" => {
            let script = settings.script.as_ref().ok_or_else(|| {
                anyhow!("estimator backend 'mediapipe' requires a helper script path")
            })?;
            Ok(Box::new(MediapipeEstimator::spawn(
                &settings.command,
                script,
            )?))
        }
        other => Err(anyhow!("unknown estimator backend '{}'", other)),
    }
}
