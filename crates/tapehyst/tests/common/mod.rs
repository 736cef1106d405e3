//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};
use tapehyst::{Buffer, HysteresisProcessor, Oversampler};

pub fn sine(len: usize, freq: f64, amplitude: f64, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|n| amplitude * (2.0 * PI * freq * n as f64 / sample_rate).sin())
        .collect()
}

pub fn sine_f32(len: usize, freq: f64, amplitude: f64, sample_rate: f64) -> Vec<f32> {
    sine(len, freq, amplitude, sample_rate).into_iter().map(|x| x as f32).collect()
}

/// Small deterministic LCG so tests don't need a random crate.
pub struct Noise(u64);

impl Noise {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform in `[-1, 1)`.
    pub fn sample(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

/// Run `inputs` (one Vec per channel) through `processor` in blocks of
/// `block_size`, returning the outputs.
pub fn render<O: Oversampler>(
    processor: &mut HysteresisProcessor<O>,
    inputs: &[Vec<f32>],
    block_size: usize,
) -> Vec<Vec<f32>> {
    let len = inputs[0].len();
    let mut outputs = vec![vec![0.0f32; len]; inputs.len()];
    let mut start = 0;
    while start < len {
        let end = (start + block_size).min(len);
        render_block(processor, inputs, &mut outputs, start, end);
        start = end;
    }
    outputs
}

/// Process `inputs[..][start..end]` as one host block.
pub fn render_block<O: Oversampler>(
    processor: &mut HysteresisProcessor<O>,
    inputs: &[Vec<f32>],
    outputs: &mut [Vec<f32>],
    start: usize,
    end: usize,
) {
    let ins = inputs.iter().map(|ch| &ch[start..end]);
    let outs = outputs.iter_mut().map(|ch| &mut ch[start..end]);
    let mut buffer = Buffer::new(ins, outs, end - start);
    processor.process(&mut buffer);
}

/// Hann-windowed magnitude spectrum.
pub fn analyze_spectrum(buffer: &[f32]) -> Vec<f64> {
    let n = buffer.len();
    let mut input: Vec<Complex<f64>> = buffer
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let window = 0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1) as f64).cos());
            Complex::new(x as f64 * window, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut input);

    input[..n / 2].iter().map(|c| c.norm()).collect()
}

/// Largest absolute second difference, i.e. the biggest slope step.
pub fn max_slope_step(signal: &[f64]) -> f64 {
    signal
        .windows(3)
        .map(|w| (w[2] - 2.0 * w[1] + w[0]).abs())
        .fold(0.0, f64::max)
}
