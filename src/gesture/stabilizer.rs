/// Default consecutive fist frames before the stable signal flips on.
pub const DEFAULT_REQUIRED_FIST_FRAMES: u32 = 3;
/// Consecutive non-fist frames before an established fist run resets.
pub const DEFAULT_REQUIRED_NO_FIST_FRAMES: u32 = 2;

/// Outcome of one stabilizer step.
#[derive(Clone, Copy, Debug)]
pub struct StabilityReport {
    pub stable_fist: bool,
    pub fist_run: u32,
    pub no_fist_run: u32,
}

/// Debounce state machine over per-frame fist classifications.
///
/// The raw classifier output is noisy; the stabilizer requires
/// `required_fist_frames` consecutive fist observations before
/// reporting a stable fist, and `required_no_fist_frames` consecutive
/// non-fist observations before dropping an established run. A single
/// spurious miss therefore does not cancel the signal, but a sustained
/// open hand (or hand loss) does.
///
/// One instance is shared by the whole server process: all connections
/// feed one logical sequence of frames.
#[derive(Clone, Debug)]
pub struct Stabilizer {
    consecutive_fist_frames: u32,
    consecutive_no_fist_frames: u32,
    required_fist_frames: u32,
    required_no_fist_frames: u32,
}

impl Stabilizer {
    pub fn new(required_fist_frames: u32, required_no_fist_frames: u32) -> Self {
        Self {
            consecutive_fist_frames: 0,
            consecutive_no_fist_frames: 0,
            required_fist_frames: required_fist_frames.max(1),
            required_no_fist_frames: required_no_fist_frames.max(1),
        }
    }

    /// Advance the state machine by one observed frame.
    ///
    /// A frame with no hand is fed as `is_fist == false`: hand loss
    /// counts toward the release hysteresis, so a latched fist cannot
    /// persist indefinitely after the hand leaves the frame.
    pub fn step(&mut self, is_fist: bool) -> StabilityReport {
        if is_fist {
            self.consecutive_fist_frames += 1;
            self.consecutive_no_fist_frames = 0;
        } else {
            self.consecutive_no_fist_frames += 1;
            if self.consecutive_no_fist_frames >= self.required_no_fist_frames {
                self.consecutive_fist_frames = 0;
            }
        }

        StabilityReport {
            stable_fist: self.consecutive_fist_frames >= self.required_fist_frames,
            fist_run: self.consecutive_fist_frames,
            no_fist_run: self.consecutive_no_fist_frames,
        }
    }

    /// Update the stability threshold. Applies to frames stepped after
    /// the call; already-counted frames are not re-evaluated.
    pub fn set_required_fist_frames(&mut self, frames: u32) {
        self.required_fist_frames = frames.max(1);
    }

    pub fn required_fist_frames(&self) -> u32 {
        self.required_fist_frames
    }

    pub fn required_no_fist_frames(&self) -> u32 {
        self.required_no_fist_frames
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_FIST_FRAMES, DEFAULT_REQUIRED_NO_FIST_FRAMES)
    }
}
