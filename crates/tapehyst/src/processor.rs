//! Block orchestrator.
//!
//! Two-phase lifecycle: a [`HysteresisPlugin`] holds parameters and options
//! with no audio state; [`HysteresisPlugin::prepare`] turns it into a
//! [`HysteresisProcessor`] with every buffer allocated for the host's
//! sample rate, block size and channel count.
//!
//! Per block, while not fully bypassed:
//!
//! ```text
//! snapshot params -> clip -> widen to f64 -> upsample -> [interleave]
//!   -> engine -> [deinterleave] -> downsample -> DC block -> narrow
//!   -> crossfade (transition blocks only)
//! ```

use std::sync::Arc;

use tapehyst_core::{
    AudioSetup, Buffer, BypassAction, BypassHandler, CrossfadeCurve, PluginConfig, PluginResult, Sample,
};

use crate::dc_blocker::{DcBlocker, DC_BLOCKER_CUTOFF_HZ};
use crate::engine::HysteresisEngine;
use crate::lanes::{padded_channels, LaneBuffer, LANE_WIDTH};
use crate::oversampling::{FirOversampler, Oversampler};
use crate::params::{HysteresisParams, ParamSnapshot};

/// Processor metadata.
pub static CONFIG: PluginConfig = PluginConfig::new("Tape Hysteresis")
    .with_vendor("tapehyst")
    .with_version(env!("CARGO_PKG_VERSION"))
    .with_category("Audio Effect")
    .with_sub_categories("Fx|Distortion");

/// Extra latency reported on top of the oversampler's, covering the
/// solver's own group delay.
pub const LATENCY_FUDGE: f32 = 1.4;

/// Processing options fixed at `prepare` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Process channels in interleaved lanes of [`LANE_WIDTH`].
    pub vectorize: bool,
    /// Curve for the one-block on/off crossfade.
    pub bypass_curve: CrossfadeCurve,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            vectorize: true,
            bypass_curve: CrossfadeCurve::Linear,
        }
    }
}

/// Unprepared processor: parameters and options only.
#[derive(Debug, Clone, Default)]
pub struct HysteresisPlugin {
    params: Arc<HysteresisParams>,
    options: ProcessorOptions,
}

impl HysteresisPlugin {
    pub fn new(params: Arc<HysteresisParams>) -> Self {
        Self { params, options: ProcessorOptions::default() }
    }

    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn params(&self) -> &Arc<HysteresisParams> {
        &self.params
    }

    pub fn options(&self) -> ProcessorOptions {
        self.options
    }

    /// Allocate a processor using the bundled FIR oversampler.
    pub fn prepare(self, setup: AudioSetup) -> PluginResult<HysteresisProcessor> {
        self.prepare_with(setup, FirOversampler::default())
    }

    /// Allocate a processor around a custom oversampler.
    pub fn prepare_with<O: Oversampler>(
        self,
        setup: AudioSetup,
        mut oversampler: O,
    ) -> PluginResult<HysteresisProcessor<O>> {
        setup.validate()?;

        let snapshot = self.params.snapshot();
        oversampler.update_factor(snapshot.oversampling);
        oversampler.prepare(setup.sample_rate, setup.max_buffer_size, setup.num_channels);
        let os_rate = setup.sample_rate * oversampler.factor() as f64;

        let (engine_channels, lanes) = if self.options.vectorize {
            (
                padded_channels::<LANE_WIDTH>(setup.num_channels),
                Some(LaneBuffer::new(
                    setup.num_channels,
                    setup.max_buffer_size * tapehyst_core::MAX_OVERSAMPLING_FACTOR,
                )),
            )
        } else {
            (setup.num_channels, None)
        };

        log::info!(
            "preparing {}: {} Hz, {} samples, {} channels, {}x oversampling, mode {}",
            CONFIG.name,
            setup.sample_rate,
            setup.max_buffer_size,
            setup.num_channels,
            oversampler.factor(),
            snapshot.mode().name(),
        );

        Ok(HysteresisProcessor {
            bypass: BypassHandler::new(self.options.bypass_curve, snapshot.enabled),
            engine: HysteresisEngine::new(engine_channels, os_rate, &snapshot),
            oversampler,
            lanes,
            work: vec![vec![0.0; setup.max_buffer_size]; setup.num_channels],
            dc_blockers: (0..setup.num_channels)
                .map(|_| DcBlocker::new(DC_BLOCKER_CUTOFF_HZ, setup.sample_rate))
                .collect(),
            enabled: snapshot.enabled,
            params: self.params,
            options: self.options,
            setup,
        })
    }
}

/// Prepared processor.
#[derive(Debug)]
pub struct HysteresisProcessor<O: Oversampler = FirOversampler> {
    params: Arc<HysteresisParams>,
    options: ProcessorOptions,
    setup: AudioSetup,
    bypass: BypassHandler,
    oversampler: O,
    engine: HysteresisEngine,
    lanes: Option<LaneBuffer>,
    /// Base-rate f64 working copy of the block, per channel
    work: Vec<Vec<f64>>,
    dc_blockers: Vec<DcBlocker>,
    /// On/off state from the most recent snapshot
    enabled: bool,
}

impl<O: Oversampler> HysteresisProcessor<O> {
    /// Release audio state and return to the unprepared plugin.
    pub fn unprepare(self) -> HysteresisPlugin {
        HysteresisPlugin { params: self.params, options: self.options }
    }

    pub fn params(&self) -> &Arc<HysteresisParams> {
        &self.params
    }

    pub fn setup(&self) -> AudioSetup {
        self.setup
    }

    pub fn engine(&self) -> &HysteresisEngine {
        &self.engine
    }

    pub fn bypass(&self) -> &BypassHandler {
        &self.bypass
    }

    pub fn oversampling_factor(&self) -> usize {
        self.oversampler.factor()
    }

    /// Latency the host should compensate, in base-rate samples.
    ///
    /// Zero while switched off.
    pub fn latency_samples(&self) -> f32 {
        if self.enabled {
            self.oversampler.latency_samples() + LATENCY_FUDGE
        } else {
            0.0
        }
    }

    /// Clear all filter and solver memory without touching parameters.
    pub fn reset(&mut self) {
        self.oversampler.reset();
        self.engine.reset();
        for dc in &mut self.dc_blockers {
            dc.reset();
        }
    }

    /// Process one block.
    ///
    /// Blocks longer than the prepared maximum are processed in chunks.
    pub fn process<S: Sample>(&mut self, buffer: &mut Buffer<S>) {
        let snapshot = self.params.snapshot();
        self.enabled = snapshot.enabled;

        let action = self.bypass.begin(snapshot.enabled);
        if action == BypassAction::Passthrough {
            buffer.copy_to_output();
            return;
        }

        self.apply_snapshot(&snapshot);

        let num_samples = buffer.num_samples();
        let mut start = 0;
        while start < num_samples {
            let len = (num_samples - start).min(self.setup.max_buffer_size);
            self.process_chunk(buffer, start, len);
            start += len;
        }

        if action == BypassAction::ProcessAndCrossfade {
            self.bypass.finish(buffer);
        }
    }

    fn apply_snapshot(&mut self, snapshot: &ParamSnapshot) {
        if self.oversampler.update_factor(snapshot.oversampling) {
            let os_rate = self.setup.sample_rate * self.oversampler.factor() as f64;
            log::debug!("oversampling -> {}x ({} Hz)", self.oversampler.factor(), os_rate);
            self.engine.set_sample_rate(os_rate);
        }
        self.engine.update(snapshot);
    }

    fn process_chunk<S: Sample>(&mut self, buffer: &mut Buffer<S>, start: usize, len: usize) {
        let ceiling = self.engine.mode().clip_level();
        let num_channels = buffer.num_channels().min(self.work.len());

        for (ch, work) in self.work.iter_mut().enumerate() {
            let work = &mut work[..len];
            if ch < num_channels {
                let input = &buffer.input(ch)[start..start + len];
                for (w, &x) in work.iter_mut().zip(input) {
                    let x = x.to_f64();
                    // NaN would poison the field history for good
                    *w = if x.is_nan() { 0.0 } else { x.clamp(-ceiling, ceiling) };
                }
            } else {
                work.fill(0.0);
            }
        }

        let os_len = self.oversampler.process_up(&self.work, len);
        match &mut self.lanes {
            Some(lanes) => {
                lanes.interleave(self.oversampler.block(), os_len);
                self.engine.process_lanes(lanes);
                lanes.deinterleave(self.oversampler.block_mut());
            }
            None => self.engine.process_planar(self.oversampler.block_mut(), os_len),
        }
        self.oversampler.process_down(&mut self.work, len);

        for (ch, (work, dc)) in self.work.iter_mut().zip(&mut self.dc_blockers).enumerate() {
            dc.process_block(&mut work[..len]);
            if ch < num_channels {
                let output = &mut buffer.output(ch)[start..start + len];
                for (y, &w) in output.iter_mut().zip(work.iter()) {
                    *y = S::from_f64(w);
                }
            }
        }

        // Channels beyond the prepared layout pass through dry
        for ch in num_channels..buffer.num_channels() {
            let (input, output) = buffer.channel_pair(ch);
            output[start..start + len].copy_from_slice(&input[start..start + len]);
        }
    }
}
