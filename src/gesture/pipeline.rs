use anyhow::Result;

use crate::estimate::{HandEstimator, HandObservation};
use crate::frame::decode_frame;
use crate::gesture::classifier::classify;
use crate::gesture::result::DetectionResult;
use crate::gesture::stabilizer::Stabilizer;

const CONFIDENCE_STABLE_FIST: f32 = 0.95;
const CONFIDENCE_HAND_PRESENT: f32 = 0.6;

/// The detect-then-stabilize pipeline.
///
/// One instance serves the whole process. Every connection's frames
/// mutate the same stabilizer counters, so callers must serialize
/// `process_frame` (the server wraps the pipeline in a mutex held for
/// the duration of a single frame, released before broadcasting).
pub struct DetectionPipeline {
    estimator: Box<dyn HandEstimator>,
    stabilizer: Stabilizer,
    inference_width: u32,
    inference_height: u32,
}

impl DetectionPipeline {
    pub fn new(
        estimator: Box<dyn HandEstimator>,
        stabilizer: Stabilizer,
        inference_width: u32,
        inference_height: u32,
    ) -> Self {
        Self {
            estimator,
            stabilizer,
            inference_width,
            inference_height,
        }
    }

    /// Run the full pipeline on one inbound frame payload.
    ///
    /// Decode and estimator failures are logged and folded into an
    /// absent observation; the frame still produces (and the caller
    /// still broadcasts) a `hand_detected: false` result.
    pub fn process_frame(&mut self, payload: &str) -> DetectionResult {
        let observation = match decode_frame(payload, self.inference_width, self.inference_height)
        {
            Ok(frame) => {
                match self
                    .estimator
                    .estimate(frame.pixels(), frame.width(), frame.height())
                {
                    Ok(observation) => observation,
                    Err(e) => {
                        log::warn!("estimator failed: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("undecodable frame payload: {}", e);
                None
            }
        };
        self.observe(observation)
    }

    /// Classify and stabilize one observation (or its absence).
    pub fn observe(&mut self, observation: Option<HandObservation>) -> DetectionResult {
        match observation {
            Some(observation) => {
                let is_fist = classify(&observation);
                let report = self.stabilizer.step(is_fist);
                DetectionResult {
                    hand_detected: true,
                    fist_detected: report.stable_fist,
                    confidence: if report.stable_fist {
                        CONFIDENCE_STABLE_FIST
                    } else {
                        CONFIDENCE_HAND_PRESENT
                    },
                    landmarks: observation.landmarks().to_vec(),
                    debug_info: format!(
                        "hand detected - fist: {}, stable: {}",
                        is_fist, report.stable_fist
                    ),
                    consecutive_frames: report.fist_run,
                    no_fist_frames: report.no_fist_run,
                }
            }
            None => {
                // Hand loss feeds the release hysteresis; see Stabilizer::step.
                let report = self.stabilizer.step(false);
                log::debug!("no hand landmarks found");
                DetectionResult {
                    hand_detected: false,
                    fist_detected: false,
                    confidence: 0.0,
                    landmarks: Vec::new(),
                    debug_info: "no hand landmarks found".to_string(),
                    consecutive_frames: report.fist_run,
                    no_fist_frames: report.no_fist_run,
                }
            }
        }
    }

    /// Apply a settings update; effective for subsequently processed
    /// frames from any client.
    pub fn set_required_fist_frames(&mut self, frames: u32) {
        self.stabilizer.set_required_fist_frames(frames);
        log::info!("stability threshold updated to {} frames", frames);
    }

    pub fn required_fist_frames(&self) -> u32 {
        self.stabilizer.required_fist_frames()
    }

    pub fn warm_up(&mut self) -> Result<()> {
        self.estimator.warm_up()
    }
}
