//! Per-channel solver state.

use crate::bias::BiasOscillator;
use crate::coefficients::HysteresisCoefficients;
use crate::model::field_derivative;
use crate::solver::{solve, SolverKind, StepInput};

/// ODE state carried between samples.
///
/// All zero is the demagnetised rest state that `prepare` and every reset
/// start from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HysteresisState {
    /// Magnetisation at the previous sample.
    pub m_n1: f64,
    /// Field at the previous sample.
    pub h_n1: f64,
    /// Field derivative at the previous sample.
    pub h_d_n1: f64,
}

impl HysteresisState {
    /// Compute one output sample without mutating `self`.
    ///
    /// Returns the new magnetisation (the output) and the state to carry
    /// into the next sample. A step that produces a non-finite magnetisation
    /// or one beyond `coeffs.upper_limit` is discarded: magnetisation and
    /// field derivative restart from zero, the field is kept.
    #[inline]
    pub fn step(
        &self,
        kind: SolverKind,
        h: f64,
        coeffs: &HysteresisCoefficients,
        period: f64,
    ) -> (f64, HysteresisState) {
        let mut h_d = field_derivative(h, self.h_n1, self.h_d_n1, period);
        let input = StepInput {
            m_n1: self.m_n1,
            h_n1: self.h_n1,
            h_d_n1: self.h_d_n1,
            h,
            h_d,
            period,
        };

        let mut m = solve(kind, &input, coeffs);
        if !m.is_finite() || m.abs() > coeffs.upper_limit {
            m = 0.0;
            h_d = 0.0;
        }

        (m, HysteresisState { m_n1: m, h_n1: h, h_d_n1: h_d })
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything one channel owns: ODE state, cooked coefficients and the
/// legacy bias oscillator.
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub hysteresis: HysteresisState,
    pub coefficients: HysteresisCoefficients,
    pub bias: BiasOscillator,
    period: f64,
}

impl ChannelState {
    /// Create a channel at rest for the given oversampled rate.
    pub fn new(sample_rate: f64) -> Self {
        let mut bias = BiasOscillator::new();
        bias.set_sample_rate(sample_rate);
        Self {
            hysteresis: HysteresisState::default(),
            coefficients: HysteresisCoefficients::default(),
            bias,
            period: 1.0 / sample_rate,
        }
    }

    /// Switch to a new oversampled rate. Solver state and bias phase restart.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.period = 1.0 / sample_rate;
        self.bias.set_sample_rate(sample_rate);
        self.reset();
    }

    /// Oversampled sample period.
    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Advance one sample with the current coefficients.
    #[inline]
    pub fn process(&mut self, kind: SolverKind, h: f64) -> f64 {
        let (y, next) = self.hysteresis.step(kind, h, &self.coefficients, self.period);
        self.hysteresis = next;
        y
    }

    /// Return to the demagnetised rest state.
    pub fn reset(&mut self) {
        self.hysteresis.reset();
        self.bias.reset();
    }
}
