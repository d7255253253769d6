use anyhow::Result;

use crate::estimate::observation::HandObservation;

/// Hand landmark estimator trait.
///
/// An estimator receives a downsampled RGB frame and returns at most
/// one hand observation (the server is configured for single-hand
/// tracking). Implementations must treat the pixel slice as read-only
/// and ephemeral; nothing may be retained beyond the `estimate` call.
pub trait HandEstimator: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Estimate hand landmarks on one frame.
    ///
    /// Returns `Ok(None)` when no hand is present; that is a normal
    /// result, not an error.
    fn estimate(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<HandObservation>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
