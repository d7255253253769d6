use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Number of keypoints in the hand topology.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (MediaPipe hand landmark convention).
#[allow(dead_code)]
pub mod landmark_index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// One normalized 3D keypoint on a tracked hand.
///
/// `x` and `y` are image-relative in roughly `[0, 1]`; `z` is depth
/// relative to the wrist. Immutable once produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another landmark in the image plane.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The full 21-landmark set for one detected hand in one frame.
///
/// Produced once per processed frame by an estimator backend and never
/// mutated. An absent hand is represented as `Option::None` at the
/// estimator seam, not as an empty observation.
#[derive(Clone, Debug)]
pub struct HandObservation {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandObservation {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build an observation from a slice, rejecting anything that is
    /// not exactly 21 landmarks.
    pub fn from_slice(landmarks: &[Landmark]) -> Result<Self> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(anyhow!(
                "hand observation requires {} landmarks, got {}",
                LANDMARK_COUNT,
                landmarks.len()
            ));
        }
        let mut fixed = [Landmark::default(); LANDMARK_COUNT];
        fixed.copy_from_slice(landmarks);
        Ok(Self { landmarks: fixed })
    }

    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }
}
