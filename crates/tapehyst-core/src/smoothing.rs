//! Parameter smoothing for avoiding zipper noise and coefficient steps.
//!
//! [`Smoother`] linearly interpolates from its current value to a new target
//! over a fixed number of samples. The hysteresis engine keeps one per
//! channel for drive, width and saturation, and one shared instance for the
//! makeup gain.
//!
//! # Usage
//!
//! ```ignore
//! let mut drive = Smoother::new(500);
//! drive.reset(0.5);
//!
//! // Once per block, from the parameter snapshot
//! drive.set_target(snapshot.drive);
//!
//! // Once per sample while the ramp is running
//! if drive.is_active() {
//!     let d = drive.advance();
//! }
//! ```
//!
//! # Thread Safety
//!
//! `Smoother` requires `&mut self` for advancing state and is intended for
//! the audio thread only. Cross-thread parameter values live in the atomic
//! parameter types.

/// A linear parameter smoother.
///
/// Reaches the target exactly after `ramp_samples` calls to
/// [`advance`](Self::advance). A smoother with a ramp length of zero is
/// "unprepared": every retarget snaps immediately.
#[derive(Debug, Clone, Default)]
pub struct Smoother {
    ramp_samples: u32,

    current: f64,
    target: f64,

    step_size: f64,
    steps_remaining: u32,
}

impl Smoother {
    /// Create a linear smoother ramping over `ramp_samples`.
    pub fn new(ramp_samples: u32) -> Self {
        Self { ramp_samples, ..Self::default() }
    }

    /// Ramp length in samples.
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }

    /// Set a new target value.
    ///
    /// Call this when the parameter value changes (typically at the start of
    /// a block). Retargeting to the current target is a no-op, so an ongoing
    /// ramp keeps its pace.
    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }

        if self.ramp_samples == 0 {
            self.reset(target);
            return;
        }

        self.target = target;
        self.steps_remaining = self.ramp_samples;
        self.step_size = (target - self.current) / self.ramp_samples as f64;
    }

    /// Reset immediately to a value (no smoothing).
    pub fn reset(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.steps_remaining = 0;
        self.step_size = 0.0;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f64 {
        if self.steps_remaining == 0 {
            return self.target;
        }

        self.steps_remaining -= 1;
        if self.steps_remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step_size;
        }
        self.current
    }

    /// Get current value without advancing.
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Returns true while still ramping toward the target.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.steps_remaining > 0
    }
}
