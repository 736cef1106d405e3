//! On/off handling with a one-block crossfade.
//!
//! Toggling the processor on or off never produces a step: the block in
//! which the switch is seen is processed and then blended against the dry
//! input, fading in or out across exactly that block.
//!
//! # Overview
//!
//! - [`BypassState`] - `Bypassed`, `Engaging`, `Active` or `Disengaging`
//! - [`BypassAction`] - What the processor should do this block
//! - [`CrossfadeCurve`] - Crossfade curve shape (Linear or EqualPower)
//! - [`BypassHandler`] - The state machine plus the crossfade itself
//!
//! # Example
//!
//! ```ignore
//! match self.bypass.begin(snapshot.enabled) {
//!     BypassAction::Passthrough => buffer.copy_to_output(),
//!     BypassAction::Process => self.process_wet(buffer),
//!     BypassAction::ProcessAndCrossfade => {
//!         self.process_wet(buffer);
//!         self.bypass.finish(buffer);
//!     }
//! }
//! ```

use crate::buffer::Buffer;
use crate::sample::Sample;

// =============================================================================
// BypassState
// =============================================================================

/// Current state of the bypass handler.
///
/// `Engaging` and `Disengaging` last exactly one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassState {
    /// Fully off, input is copied to output.
    Bypassed,
    /// Fading from dry to wet during the current block.
    Engaging,
    /// Fully on.
    Active,
    /// Fading from wet to dry during the current block.
    Disengaging,
}

// =============================================================================
// BypassAction
// =============================================================================

/// What action the processor should take for this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassAction {
    /// Fully bypassed. Copy input to output, no DSP.
    Passthrough,

    /// Fully active. Run the DSP normally.
    Process,

    /// Transitioning. Run the DSP, then call [`BypassHandler::finish()`].
    ProcessAndCrossfade,
}

// =============================================================================
// CrossfadeCurve
// =============================================================================

/// Crossfade curve shape for on/off transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossfadeCurve {
    /// Linear crossfade.
    /// gain = position (0.0 to 1.0)
    #[default]
    Linear,

    /// Equal-power crossfade. Maintains constant loudness during transition.
    /// gain = sin(position * PI/2) for fade-in, cos(position * PI/2) for fade-out
    EqualPower,
}

impl CrossfadeCurve {
    /// Calculate wet and dry gains for a given ramp position.
    ///
    /// `t` is the normalized position (0.0 = fully wet, 1.0 = fully dry).
    /// Returns `(wet_gain, dry_gain)`.
    #[inline]
    pub fn gains(&self, t: f64) -> (f64, f64) {
        match self {
            CrossfadeCurve::Linear => (1.0 - t, t),
            CrossfadeCurve::EqualPower => {
                let angle = t * std::f64::consts::FRAC_PI_2;
                (angle.cos(), angle.sin())
            }
        }
    }
}

// =============================================================================
// BypassHandler
// =============================================================================

/// On/off state machine with a one-block crossfade.
///
/// The handler is not generic over sample type; [`finish()`](Self::finish)
/// is, so one instance serves both `Buffer<f32>` and `Buffer<f64>`.
///
/// # Real-Time Safety
///
/// No heap allocations.
#[derive(Debug, Clone)]
pub struct BypassHandler {
    state: BypassState,
    curve: CrossfadeCurve,
}

impl BypassHandler {
    /// Create a handler starting fully on (`enabled`) or fully off.
    pub fn new(curve: CrossfadeCurve, enabled: bool) -> Self {
        Self {
            state: if enabled {
                BypassState::Active
            } else {
                BypassState::Bypassed
            },
            curve,
        }
    }

    /// Get the current state.
    #[inline]
    pub fn state(&self) -> BypassState {
        self.state
    }

    /// Returns true if fully bypassed (not ramping).
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.state == BypassState::Bypassed
    }

    /// Returns true if in a one-block transition.
    #[inline]
    pub fn is_ramping(&self) -> bool {
        matches!(self.state, BypassState::Engaging | BypassState::Disengaging)
    }

    /// Get the crossfade curve.
    #[inline]
    pub fn curve(&self) -> CrossfadeCurve {
        self.curve
    }

    /// Begin processing for this block.
    ///
    /// `enabled` is the on/off parameter read from this block's snapshot.
    pub fn begin(&mut self, enabled: bool) -> BypassAction {
        self.settle();

        self.state = match (self.state, enabled) {
            (BypassState::Active, false) => BypassState::Disengaging,
            (BypassState::Bypassed, true) => BypassState::Engaging,
            (state, _) => state,
        };

        match self.state {
            BypassState::Bypassed => BypassAction::Passthrough,
            BypassState::Active => BypassAction::Process,
            BypassState::Engaging | BypassState::Disengaging => BypassAction::ProcessAndCrossfade,
        }
    }

    /// Finish a transition block by blending the wet output with the dry
    /// input across the whole block, then land in the stable state.
    pub fn finish<S: Sample>(&mut self, buffer: &mut Buffer<S>) {
        let fading_out = match self.state {
            BypassState::Disengaging => true,
            BypassState::Engaging => false,
            _ => return,
        };

        let num_samples = buffer.num_samples();
        let n = num_samples.max(1) as f64;

        for ch in 0..buffer.num_channels() {
            let (input, output) = buffer.channel_pair(ch);
            for (i, (dry, wet)) in input.iter().zip(output.iter_mut()).enumerate() {
                // Last sample of the block sits exactly on the destination
                let progress = (i + 1) as f64 / n;
                let t = if fading_out { progress } else { 1.0 - progress };
                let (wet_gain, dry_gain) = self.curve.gains(t);
                *wet = S::from_f64(wet.to_f64() * wet_gain + dry.to_f64() * dry_gain);
            }
        }

        self.settle();
    }

    fn settle(&mut self) {
        self.state = match self.state {
            BypassState::Engaging => BypassState::Active,
            BypassState::Disengaging => BypassState::Bypassed,
            state => state,
        };
    }
}

impl Default for BypassHandler {
    /// Create a handler that starts active with a linear curve.
    fn default() -> Self {
        Self::new(CrossfadeCurve::Linear, true)
    }
}
