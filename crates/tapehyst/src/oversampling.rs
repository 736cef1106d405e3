//! Oversampling around the hysteresis engine.
//!
//! Hysteresis generates harmonics well above the base Nyquist frequency, so
//! the engine runs at a multiple of the host rate:
//!
//! ```text
//! base block -> zero-stuff + FIR lowpass (up) -> engine at F x fs -> FIR lowpass + decimate (down)
//! ```
//!
//! The processor only talks to the [`Oversampler`] trait. [`FirOversampler`]
//! is the bundled implementation: linear-phase windowed-sinc filters designed
//! for every supported factor up front, so switching factor on the audio
//! thread never allocates.

use std::f64::consts::PI;

use tapehyst_core::MAX_OVERSAMPLING_FACTOR;

/// Display names in parameter-index order.
pub const OS_FACTOR_NAMES: [&str; 5] = ["1x", "2x", "4x", "8x", "16x"];

/// Supported oversampling factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OsFactor {
    One,
    #[default]
    Two,
    Four,
    Eight,
    Sixteen,
}

impl OsFactor {
    pub const ALL: [OsFactor; 5] = [
        OsFactor::One,
        OsFactor::Two,
        OsFactor::Four,
        OsFactor::Eight,
        OsFactor::Sixteen,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Multiplier applied to the base sample rate.
    pub fn factor(self) -> usize {
        1 << self.index()
    }

    pub fn name(self) -> &'static str {
        OS_FACTOR_NAMES[self.index()]
    }
}

/// Up/down sampling stage driven by the processor once per block.
///
/// Implementations own the oversampled block between [`process_up`] and
/// [`process_down`]; the engine works on it in place through
/// [`block_mut`].
///
/// [`process_up`]: Oversampler::process_up
/// [`process_down`]: Oversampler::process_down
/// [`block_mut`]: Oversampler::block_mut
pub trait Oversampler: Send {
    /// Allocate everything needed for blocks of up to `max_block_size` base
    /// samples at any supported factor.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize);

    /// Switch to `requested` if it differs from the current factor.
    ///
    /// Returns `true` when the factor changed. Filter memory is cleared on a
    /// change.
    fn update_factor(&mut self, requested: OsFactor) -> bool;

    /// Current oversampling factor.
    fn factor(&self) -> usize;

    /// Upsample `num_samples` base samples per channel into the internal
    /// block. Returns the oversampled length.
    fn process_up(&mut self, input: &[Vec<f64>], num_samples: usize) -> usize;

    /// Oversampled block written by the last `process_up`.
    fn block(&self) -> &[Vec<f64>];

    fn block_mut(&mut self) -> &mut [Vec<f64>];

    /// Downsample the internal block into `num_samples` base samples per
    /// channel of `output`.
    fn process_down(&mut self, output: &mut [Vec<f64>], num_samples: usize);

    /// Round-trip delay in base-rate samples.
    fn latency_samples(&self) -> f32;

    /// Clear filter memory.
    fn reset(&mut self);
}

/// Filter length is `TAPS_PER_FACTOR * factor + 1`.
const TAPS_PER_FACTOR: usize = 32;

/// Passband edge as a fraction of the base Nyquist frequency.
const CUTOFF_RATIO: f64 = 0.9;

/// Base-rate history the polyphase upsampler needs.
const UP_HISTORY: usize = TAPS_PER_FACTOR + 1;

/// Windowed-sinc FIR oversampler.
#[derive(Debug, Clone)]
pub struct FirOversampler {
    os_factor: OsFactor,
    /// One lowpass per supported factor, indexed by `OsFactor::index()`
    filters: Vec<Vec<f64>>,
    max_block_size: usize,
    /// Base-rate history followed by the incoming block, per channel
    up_buffers: Vec<Vec<f64>>,
    /// Oversampled history followed by the processed block, per channel
    down_buffers: Vec<Vec<f64>>,
    block: Vec<Vec<f64>>,
}

impl FirOversampler {
    pub fn new(os_factor: OsFactor) -> Self {
        Self {
            os_factor,
            filters: OsFactor::ALL.iter().map(|f| design_lowpass(f.factor())).collect(),
            max_block_size: 0,
            up_buffers: Vec::new(),
            down_buffers: Vec::new(),
            block: Vec::new(),
        }
    }

    pub fn os_factor(&self) -> OsFactor {
        self.os_factor
    }

    fn filter(&self) -> &[f64] {
        &self.filters[self.os_factor.index()]
    }

    fn down_history(&self) -> usize {
        self.filter().len() - 1
    }
}

impl Default for FirOversampler {
    fn default() -> Self {
        Self::new(OsFactor::default())
    }
}

impl Oversampler for FirOversampler {
    fn prepare(&mut self, _sample_rate: f64, max_block_size: usize, num_channels: usize) {
        let max_os = max_block_size * MAX_OVERSAMPLING_FACTOR;
        let max_history = TAPS_PER_FACTOR * MAX_OVERSAMPLING_FACTOR;

        self.max_block_size = max_block_size;
        self.up_buffers = vec![vec![0.0; UP_HISTORY + max_block_size]; num_channels];
        self.down_buffers = vec![vec![0.0; max_history + max_os]; num_channels];
        self.block = vec![vec![0.0; max_os]; num_channels];
    }

    fn update_factor(&mut self, requested: OsFactor) -> bool {
        if requested == self.os_factor {
            return false;
        }
        self.os_factor = requested;
        self.reset();
        true
    }

    fn factor(&self) -> usize {
        self.os_factor.factor()
    }

    fn process_up(&mut self, input: &[Vec<f64>], num_samples: usize) -> usize {
        debug_assert!(num_samples <= self.max_block_size);
        let num_samples = num_samples.min(self.max_block_size);
        let factor = self.factor();
        let os_len = num_samples * factor;

        let filter = &self.filters[self.os_factor.index()];
        let gain = factor as f64;

        for ((src, hist), out) in input.iter().zip(&mut self.up_buffers).zip(&mut self.block) {
            if factor == 1 {
                out[..num_samples].copy_from_slice(&src[..num_samples]);
                continue;
            }

            hist[UP_HISTORY..UP_HISTORY + num_samples].copy_from_slice(&src[..num_samples]);

            for i in 0..num_samples {
                let newest = UP_HISTORY + i;
                for phase in 0..factor {
                    let mut acc = 0.0;
                    for (j, &h) in filter[phase..].iter().step_by(factor).enumerate() {
                        acc += h * hist[newest - j];
                    }
                    out[i * factor + phase] = gain * acc;
                }
            }

            hist.copy_within(num_samples..num_samples + UP_HISTORY, 0);
        }

        os_len
    }

    fn block(&self) -> &[Vec<f64>] {
        &self.block
    }

    fn block_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.block
    }

    fn process_down(&mut self, output: &mut [Vec<f64>], num_samples: usize) {
        let num_samples = num_samples.min(self.max_block_size);
        let factor = self.factor();
        let os_len = num_samples * factor;
        let history = self.down_history();

        let filter = &self.filters[self.os_factor.index()];

        for ((dst, buf), os) in output.iter_mut().zip(&mut self.down_buffers).zip(&self.block) {
            if factor == 1 {
                dst[..num_samples].copy_from_slice(&os[..num_samples]);
                continue;
            }

            buf[history..history + os_len].copy_from_slice(&os[..os_len]);

            for (i, y) in dst[..num_samples].iter_mut().enumerate() {
                let newest = history + i * factor;
                *y = filter
                    .iter()
                    .enumerate()
                    .map(|(k, &h)| h * buf[newest - k])
                    .sum();
            }

            buf.copy_within(os_len..os_len + history, 0);
        }
    }

    fn latency_samples(&self) -> f32 {
        match self.factor() {
            1 => 0.0,
            // Each linear-phase filter delays by half its length at the
            // oversampled rate
            factor => self.down_history() as f32 / factor as f32,
        }
    }

    fn reset(&mut self) {
        for buf in self.up_buffers.iter_mut().chain(&mut self.down_buffers) {
            buf.fill(0.0);
        }
    }
}

/// Blackman-windowed sinc lowpass with unity DC gain.
fn design_lowpass(factor: usize) -> Vec<f64> {
    let len = TAPS_PER_FACTOR * factor + 1;
    let centre = (len - 1) as f64 * 0.5;
    let cutoff = CUTOFF_RATIO * 0.5 / factor as f64;

    let mut taps: Vec<f64> = (0..len)
        .map(|i| {
            let x = i as f64 - centre;
            let sinc = if x == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * PI * cutoff * x).sin() / (PI * x)
            };
            let phase = 2.0 * PI * i as f64 / (len - 1) as f64;
            let window = 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos();
            sinc * window
        })
        .collect();

    let sum: f64 = taps.iter().sum();
    for tap in &mut taps {
        *tap /= sum;
    }
    taps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_round_trip(factor: OsFactor, input: &[f64], block: usize) -> Vec<f64> {
        let mut os = FirOversampler::new(factor);
        os.prepare(48_000.0, block, 1);
        let mut out = Vec::with_capacity(input.len());
        let mut work = vec![vec![0.0; block]];
        for chunk in input.chunks(block) {
            work[0][..chunk.len()].copy_from_slice(chunk);
            os.process_up(&work, chunk.len());
            os.process_down(&mut work, chunk.len());
            out.extend_from_slice(&work[0][..chunk.len()]);
        }
        out
    }

    #[test]
    fn test_factor_indices() {
        assert_eq!(OsFactor::default(), OsFactor::Two);
        for (i, f) in OsFactor::ALL.iter().enumerate() {
            assert_eq!(OsFactor::from_index(i), Some(*f));
            assert_eq!(f.factor(), 1 << i);
        }
        assert_eq!(OsFactor::from_index(5), None);
    }

    #[test]
    fn test_filters_have_unity_dc_gain() {
        for f in OsFactor::ALL {
            let taps = design_lowpass(f.factor());
            assert!((taps.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert_eq!(taps.len() % 2, 1);
        }
    }

    #[test]
    fn test_unity_factor_is_passthrough() {
        let input: Vec<f64> = (0..100).map(|n| (n as f64 * 0.1).sin()).collect();
        let out = run_round_trip(OsFactor::One, &input, 32);
        assert_eq!(out, input);
    }

    #[test]
    fn test_round_trip_delays_by_reported_latency() {
        for factor in [OsFactor::Two, OsFactor::Four, OsFactor::Eight] {
            let mut os = FirOversampler::new(factor);
            os.prepare(48_000.0, 64, 1);
            let latency = os.latency_samples().round() as usize;
            assert_eq!(latency as f32, os.latency_samples());

            let input: Vec<f64> = (0..2048)
                .map(|n| (2.0 * PI * 1000.0 * n as f64 / 48_000.0).sin())
                .collect();
            let out = run_round_trip(factor, &input, 64);

            for n in 1024..2048 {
                assert!(
                    (out[n] - input[n - latency]).abs() < 1e-3,
                    "{}: sample {n} off by {}",
                    factor.name(),
                    (out[n] - input[n - latency]).abs()
                );
            }
        }
    }

    #[test]
    fn test_result_independent_of_block_size() {
        let input: Vec<f64> = (0..777).map(|n| ((n * 7919) % 101) as f64 / 50.0 - 1.0).collect();
        let a = run_round_trip(OsFactor::Four, &input, 64);
        let b = run_round_trip(OsFactor::Four, &input, 17);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_update_factor_reports_change() {
        let mut os = FirOversampler::default();
        os.prepare(44_100.0, 16, 2);
        assert!(!os.update_factor(OsFactor::Two));
        assert!(os.update_factor(OsFactor::Sixteen));
        assert_eq!(os.factor(), 16);
        assert_eq!(os.latency_samples(), 32.0);
    }
}
