//! V1 processing kernel.
//!
//! The first generation of the model worked in a much larger magnetisation
//! range and drove the tape with an explicit bias tone instead of folding
//! bias into the loop width. Signals are scaled into that range before the
//! RK4 step and normalised back afterwards.

use crate::bias::bias_amplitude;
use crate::solver::SolverKind;
use crate::state::ChannelState;

/// Scale from audio level to the V1 field range.
pub const INPUT_SCALE: f64 = 10_000.0;

/// Scale from V1 magnetisation back to audio level.
pub const OUTPUT_NORM: f64 = 1.414 / 10_000.0;

/// Process one sample through the V1 model.
///
/// `width` is the internal loop width; narrower loops get more bias. The
/// channel's coefficients must already be cooked with the legacy constants.
#[inline]
pub fn process_sample(channel: &mut ChannelState, width: f64, x: f64) -> f64 {
    let bias = bias_amplitude(width) * channel.bias.next_sample();
    channel.process(SolverKind::Rk4, (x + bias) * INPUT_SCALE) * OUTPUT_NORM
}
