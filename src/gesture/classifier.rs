use crate::estimate::{landmark_index as li, HandObservation};

/// Vertical margin a fingertip must sit below its middle joint to
/// count as folded (normalized image coordinates, y grows downward).
const FOLD_MARGIN: f32 = 0.02;

/// Maximum planar distance between thumb tip and index base for a
/// folded thumb.
const THUMB_FOLD_DISTANCE: f32 = 0.15;

/// Classify one hand observation as fist-like.
///
/// Pure and total over well-formed observations: all four fingers
/// folded past their middle joints, the thumb tucked against the index
/// base, and every fingertip below its base joint.
pub fn classify(observation: &HandObservation) -> bool {
    let lm = |index: usize| observation.landmark(index);

    let index_folded = lm(li::INDEX_TIP).y > lm(li::INDEX_PIP).y + FOLD_MARGIN;
    let middle_folded = lm(li::MIDDLE_TIP).y > lm(li::MIDDLE_PIP).y + FOLD_MARGIN;
    let ring_folded = lm(li::RING_TIP).y > lm(li::RING_PIP).y + FOLD_MARGIN;
    let pinky_folded = lm(li::PINKY_TIP).y > lm(li::PINKY_PIP).y + FOLD_MARGIN;

    let thumb_folded =
        lm(li::THUMB_TIP).planar_distance(&lm(li::INDEX_MCP)) < THUMB_FOLD_DISTANCE;

    let fingertips_below_base = lm(li::INDEX_TIP).y > lm(li::INDEX_MCP).y
        && lm(li::MIDDLE_TIP).y > lm(li::MIDDLE_MCP).y
        && lm(li::RING_TIP).y > lm(li::RING_MCP).y
        && lm(li::PINKY_TIP).y > lm(li::PINKY_MCP).y;

    index_folded
        && middle_folded
        && ring_folded
        && pinky_folded
        && thumb_folded
        && fingertips_below_base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{synthetic_fist, synthetic_open_hand, HandObservation, Landmark};

    fn with_landmark(base: &HandObservation, index: usize, landmark: Landmark) -> HandObservation {
        let mut landmarks = *base.landmarks();
        landmarks[index] = landmark;
        HandObservation::new(landmarks)
    }

    #[test]
    fn synthetic_fist_classifies_true() {
        assert!(classify(&synthetic_fist()));
    }

    #[test]
    fn open_hand_classifies_false() {
        assert!(!classify(&synthetic_open_hand()));
    }

    #[test]
    fn extending_index_breaks_fist() {
        let fist = synthetic_fist();
        let pip = fist.landmark(li::INDEX_PIP);
        // Tip raised above the fold margin but still below the base.
        let raised = Landmark::new(pip.x, pip.y + 0.01, 0.0);
        let obs = with_landmark(&fist, li::INDEX_TIP, raised);
        assert!(!classify(&obs));
    }

    #[test]
    fn extending_middle_breaks_fist() {
        let fist = synthetic_fist();
        let pip = fist.landmark(li::MIDDLE_PIP);
        let raised = Landmark::new(pip.x, pip.y + 0.01, 0.0);
        assert!(!classify(&with_landmark(&fist, li::MIDDLE_TIP, raised)));
    }

    #[test]
    fn extending_ring_breaks_fist() {
        let fist = synthetic_fist();
        let pip = fist.landmark(li::RING_PIP);
        let raised = Landmark::new(pip.x, pip.y + 0.01, 0.0);
        assert!(!classify(&with_landmark(&fist, li::RING_TIP, raised)));
    }

    #[test]
    fn extending_pinky_breaks_fist() {
        let fist = synthetic_fist();
        let pip = fist.landmark(li::PINKY_PIP);
        let raised = Landmark::new(pip.x, pip.y + 0.01, 0.0);
        assert!(!classify(&with_landmark(&fist, li::PINKY_TIP, raised)));
    }

    #[test]
    fn distant_thumb_breaks_fist() {
        let fist = synthetic_fist();
        let away = Landmark::new(0.10, 0.52, 0.0);
        assert!(!classify(&with_landmark(&fist, li::THUMB_TIP, away)));
    }

    #[test]
    fn fingertip_above_base_breaks_fist() {
        let fist = synthetic_fist();
        let mcp = fist.landmark(li::INDEX_MCP);
        let pip = fist.landmark(li::INDEX_PIP);
        // Still folded past the middle joint, but above the base.
        let tip = Landmark::new(mcp.x, pip.y + FOLD_MARGIN + 0.005, 0.0);
        let obs = with_landmark(&fist, li::INDEX_TIP, tip);
        // Sanity: the fold condition must still hold for this variant.
        assert!(obs.landmark(li::INDEX_TIP).y > obs.landmark(li::INDEX_PIP).y + FOLD_MARGIN);
        assert!(obs.landmark(li::INDEX_TIP).y < obs.landmark(li::INDEX_MCP).y);
        assert!(!classify(&obs));
    }
}
