//! High-frequency bias oscillator for the legacy mode.
//!
//! Runs at half the oversampled rate, so every sample advances the phase by
//! exactly pi.

use std::f64::consts::{PI, TAU};

/// Peak bias amplitude for a fully narrow loop.
pub const BIAS_GAIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BiasOscillator {
    phase: f64,
    increment: f64,
}

impl BiasOscillator {
    pub fn new() -> Self {
        Self { phase: 0.0, increment: PI }
    }

    /// Place the bias tone at half of `sample_rate`.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        let frequency = sample_rate * 0.5;
        self.increment = TAU * (frequency / sample_rate);
    }

    /// Current phase in radians, in [0, 2pi).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Unit-amplitude bias sample at the current phase, then advance.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let out = self.phase.sin();
        self.phase += self.increment;
        while self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }
}

impl Default for BiasOscillator {
    fn default() -> Self {
        Self::new()
    }
}

/// Bias amplitude for the given internal width.
#[inline]
pub fn bias_amplitude(width: f64) -> f64 {
    BIAS_GAIN * (1.0 - width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_advances_by_pi_and_wraps() {
        let mut osc = BiasOscillator::new();
        osc.set_sample_rate(192_000.0);
        osc.next_sample();
        assert!((osc.phase() - PI).abs() < 1e-12);
        osc.next_sample();
        assert!(osc.phase() < 1e-9);
        for _ in 0..1001 {
            osc.next_sample();
            assert!(osc.phase() >= 0.0 && osc.phase() < TAU);
        }
    }

    #[test]
    fn test_output_is_tiny_at_nyquist() {
        let mut osc = BiasOscillator::new();
        for _ in 0..64 {
            assert!(osc.next_sample().abs() < 1e-9);
        }
    }

    #[test]
    fn test_bias_amplitude() {
        assert_eq!(bias_amplitude(1.0), 0.0);
        assert_eq!(bias_amplitude(0.25), 7.5);
    }
}
