//! First-order high-pass for removing the DC offset hysteresis leaves behind.

use std::f64::consts::PI;

/// Cutoff used on the processor output.
pub const DC_BLOCKER_CUTOFF_HZ: f64 = 35.0;

/// Bilinear-transform first-order high-pass filter.
#[derive(Debug, Clone)]
pub struct DcBlocker {
    b0: f64,
    a1: f64,
    /// Previous input
    x1: f64,
    /// Previous output
    y1: f64,
}

impl DcBlocker {
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Self {
        let mut filter = Self { b0: 1.0, a1: 0.0, x1: 0.0, y1: 0.0 };
        filter.set_cutoff(cutoff_hz, sample_rate);
        filter
    }

    /// Recompute coefficients. Filter memory is kept.
    pub fn set_cutoff(&mut self, cutoff_hz: f64, sample_rate: f64) {
        let nyquist_guard = sample_rate * 0.49;
        let k = (PI * cutoff_hz.clamp(0.0, nyquist_guard) / sample_rate).tan();
        self.b0 = 1.0 / (1.0 + k);
        self.a1 = (k - 1.0) / (k + 1.0);
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * (x - self.x1) - self.a1 * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    pub fn process_block(&mut self, samples: &mut [f64]) {
        for sample in samples {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
