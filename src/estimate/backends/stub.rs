use anyhow::Result;

use crate::estimate::backend::HandEstimator;
use crate::estimate::observation::{landmark_index as li, HandObservation, Landmark, LANDMARK_COUNT};

/// Posture reported by the stub estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StubPosture {
    NoHand,
    OpenHand,
    Fist,
}

/// Stub estimator for tests and hardware-free runs.
///
/// Emits a fixed synthetic posture on every frame, ignoring pixel
/// content entirely.
pub struct StubEstimator {
    posture: StubPosture,
}

impl StubEstimator {
    pub fn new(posture: StubPosture) -> Self {
        Self { posture }
    }

    pub fn no_hand() -> Self {
        Self::new(StubPosture::NoHand)
    }

    pub fn open_hand() -> Self {
        Self::new(StubPosture::OpenHand)
    }

    pub fn fist() -> Self {
        Self::new(StubPosture::Fist)
    }

    pub fn set_posture(&mut self, posture: StubPosture) {
        self.posture = posture;
    }
}

impl HandEstimator for StubEstimator {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn estimate(
        &mut self,
        _pixels: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<Option<HandObservation>> {
        Ok(match self.posture {
            StubPosture::NoHand => None,
            StubPosture::OpenHand => Some(synthetic_open_hand()),
            StubPosture::Fist => Some(synthetic_fist()),
        })
    }
}

/// Synthetic observation of a closed fist: every fingertip sits below
/// its middle joint and base, and the thumb tip rests next to the
/// index base.
pub fn synthetic_fist() -> HandObservation {
    let mut lm = [Landmark::default(); LANDMARK_COUNT];
    lm[li::WRIST] = Landmark::new(0.50, 0.70, 0.0);
    lm[li::THUMB_TIP] = Landmark::new(0.48, 0.52, 0.0);

    for &(mcp, pip, tip, x) in &[
        (li::INDEX_MCP, li::INDEX_PIP, li::INDEX_TIP, 0.50),
        (li::MIDDLE_MCP, li::MIDDLE_PIP, li::MIDDLE_TIP, 0.55),
        (li::RING_MCP, li::RING_PIP, li::RING_TIP, 0.60),
        (li::PINKY_MCP, li::PINKY_PIP, li::PINKY_TIP, 0.65),
    ] {
        lm[mcp] = Landmark::new(x, 0.50, 0.0);
        lm[pip] = Landmark::new(x, 0.45, 0.0);
        lm[tip] = Landmark::new(x, 0.56, 0.0);
    }
    HandObservation::new(lm)
}

/// Synthetic observation of an open hand: fingertips extended above
/// their joints, thumb well away from the index base.
pub fn synthetic_open_hand() -> HandObservation {
    let mut lm = [Landmark::default(); LANDMARK_COUNT];
    lm[li::WRIST] = Landmark::new(0.50, 0.70, 0.0);
    lm[li::THUMB_TIP] = Landmark::new(0.20, 0.30, 0.0);

    for &(mcp, pip, tip, x) in &[
        (li::INDEX_MCP, li::INDEX_PIP, li::INDEX_TIP, 0.50),
        (li::MIDDLE_MCP, li::MIDDLE_PIP, li::MIDDLE_TIP, 0.55),
        (li::RING_MCP, li::RING_PIP, li::RING_TIP, 0.60),
        (li::PINKY_MCP, li::PINKY_PIP, li::PINKY_TIP, 0.65),
    ] {
        lm[mcp] = Landmark::new(x, 0.50, 0.0);
        lm[pip] = Landmark::new(x, 0.40, 0.0);
        lm[tip] = Landmark::new(x, 0.25, 0.0);
    }
    HandObservation::new(lm)
}
