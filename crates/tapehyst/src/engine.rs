//! Per-block hysteresis engine at the oversampled rate.
//!
//! The engine owns every channel's solver state and control smoothers and
//! runs one of four inner loops per block:
//!
//! | path                 | coefficients                    | makeup |
//! |----------------------|---------------------------------|--------|
//! | `Classic`            | cooked once at block start      | yes    |
//! | `ClassicSmoothing`   | re-cooked every sample          | yes    |
//! | `Legacy`             | re-cooked every sample          | no     |
//! | `LegacySmoothing`    | re-cooked every sample, ramping | no     |
//!
//! The path is chosen once per block from the mode and whether any control
//! is still ramping; the sample loops never look at the mode.

use tapehyst_core::Smoother;

use crate::coefficients::{makeup_gain, HysteresisCoefficients};
use crate::lanes::LaneBuffer;
use crate::legacy;
use crate::mode::TapeMode;
use crate::params::ParamSnapshot;
use crate::solver::SolverKind;
use crate::state::ChannelState;

/// Ramp length for control and makeup smoothing, in oversampled samples.
pub const SMOOTHING_STEPS: u32 = 500;

/// Inner loop selected for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessPath {
    Classic(SolverKind),
    ClassicSmoothing(SolverKind),
    Legacy,
    LegacySmoothing,
}

impl ProcessPath {
    pub fn is_legacy(self) -> bool {
        matches!(self, ProcessPath::Legacy | ProcessPath::LegacySmoothing)
    }

    pub fn is_smoothing(self) -> bool {
        matches!(self, ProcessPath::ClassicSmoothing(_) | ProcessPath::LegacySmoothing)
    }
}

/// Drive, width and saturation ramps for one channel.
#[derive(Debug, Clone)]
pub struct ControlSmoothers {
    pub drive: Smoother,
    /// Internal width, i.e. `1 - bias`.
    pub width: Smoother,
    pub saturation: Smoother,
}

impl ControlSmoothers {
    fn new(snapshot: &ParamSnapshot) -> Self {
        let mut controls = Self {
            drive: Smoother::new(SMOOTHING_STEPS),
            width: Smoother::new(SMOOTHING_STEPS),
            saturation: Smoother::new(SMOOTHING_STEPS),
        };
        controls.snap(snapshot);
        controls
    }

    fn snap(&mut self, snapshot: &ParamSnapshot) {
        self.drive.reset(snapshot.drive);
        self.width.reset(snapshot.width());
        self.saturation.reset(snapshot.saturation);
    }

    fn set_targets(&mut self, snapshot: &ParamSnapshot) {
        self.drive.set_target(snapshot.drive);
        self.width.set_target(snapshot.width());
        self.saturation.set_target(snapshot.saturation);
    }

    pub fn is_active(&self) -> bool {
        self.drive.is_active() || self.width.is_active() || self.saturation.is_active()
    }

    #[inline]
    fn advance(&mut self) -> (f64, f64, f64) {
        (self.drive.advance(), self.width.advance(), self.saturation.advance())
    }

    #[inline]
    fn current(&self) -> (f64, f64, f64) {
        (self.drive.current(), self.width.current(), self.saturation.current())
    }

    #[inline]
    fn cook(&self, legacy: bool) -> HysteresisCoefficients {
        let (drive, width, saturation) = self.current();
        HysteresisCoefficients::cook(drive, width, saturation, legacy)
    }
}

/// Multichannel hysteresis engine.
///
/// All storage is sized in [`new`](Self::new); nothing on the processing
/// path allocates.
#[derive(Debug, Clone)]
pub struct HysteresisEngine {
    channels: Vec<ChannelState>,
    controls: Vec<ControlSmoothers>,
    makeup: Smoother,
    mode: TapeMode,
    /// Set when the mode crosses between classic and legacy; forces one
    /// smoothing block so coefficients are re-cooked for the new family.
    family_changed: bool,
    sample_rate: f64,
}

impl HysteresisEngine {
    /// Create an engine for `num_channels` channels at the oversampled
    /// `sample_rate`, starting from `snapshot` with no ramps in progress.
    pub fn new(num_channels: usize, sample_rate: f64, snapshot: &ParamSnapshot) -> Self {
        let mode = snapshot.mode();
        let mut makeup = Smoother::new(SMOOTHING_STEPS);
        makeup.reset(makeup_gain(snapshot.width(), snapshot.saturation));

        let mut engine = Self {
            channels: (0..num_channels).map(|_| ChannelState::new(sample_rate)).collect(),
            controls: (0..num_channels).map(|_| ControlSmoothers::new(snapshot)).collect(),
            makeup,
            mode,
            family_changed: false,
            sample_rate,
        };
        engine.recook();
        engine
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn mode(&self) -> TapeMode {
        self.mode
    }

    /// Oversampled rate the solvers run at.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Read-only view of per-channel solver state, for inspection.
    ///
    /// Nothing outside the engine mutates it; use [`reset`](Self::reset) to clear.
    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    /// Read-only view of the per-channel control smoothers, for inspection.
    pub fn controls(&self) -> &[ControlSmoothers] {
        &self.controls
    }

    /// Read-only view of the shared makeup-gain smoother, for inspection.
    pub fn makeup(&self) -> &Smoother {
        &self.makeup
    }

    /// Move to a new oversampled rate. Every channel restarts from rest.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        for channel in &mut self.channels {
            channel.set_sample_rate(sample_rate);
        }
        self.recook();
    }

    /// Return every channel to the demagnetised rest state.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    /// Jump every control and the makeup gain straight to `snapshot`.
    pub fn snap_controls(&mut self, snapshot: &ParamSnapshot) {
        for controls in &mut self.controls {
            controls.snap(snapshot);
        }
        self.makeup.reset(makeup_gain(snapshot.width(), snapshot.saturation));
        self.recook();
    }

    /// Apply this block's parameter snapshot.
    ///
    /// Retargets every smoother and, when the mode changed, resets every
    /// channel. Returns the path the next `process_*` call will take.
    pub fn update(&mut self, snapshot: &ParamSnapshot) -> ProcessPath {
        let mode = snapshot.mode();
        if mode != self.mode {
            log::debug!("tape mode {} -> {}", self.mode.name(), mode.name());
            if mode.is_legacy() != self.mode.is_legacy() {
                self.family_changed = true;
            }
            self.mode = mode;
            self.reset();
        }

        for controls in &mut self.controls {
            controls.set_targets(snapshot);
        }
        self.makeup.set_target(makeup_gain(snapshot.width(), snapshot.saturation));

        self.path()
    }

    /// Path for the next block given the current mode and ramps.
    pub fn path(&self) -> ProcessPath {
        let smoothing = self.family_changed || self.controls.iter().any(ControlSmoothers::is_active);
        match (self.mode, smoothing) {
            (TapeMode::Classic(kind), false) => ProcessPath::Classic(kind),
            (TapeMode::Classic(kind), true) => ProcessPath::ClassicSmoothing(kind),
            (TapeMode::Legacy, false) => ProcessPath::Legacy,
            (TapeMode::Legacy, true) => ProcessPath::LegacySmoothing,
        }
    }

    /// Process planar channels in place.
    ///
    /// Channels beyond [`num_channels`](Self::num_channels) are left
    /// untouched.
    pub fn process_planar<C: AsMut<[f64]>>(&mut self, buffers: &mut [C], num_samples: usize) {
        let path = self.begin_block();

        match path {
            ProcessPath::Classic(kind) => {
                self.run_planar(buffers, num_samples, |ch, _, x| ch.process(kind, x))
            }
            ProcessPath::ClassicSmoothing(kind) => {
                self.run_planar(buffers, num_samples, |ch, c, x| classic_smoothing(kind, ch, c, x))
            }
            ProcessPath::Legacy => self.run_planar(buffers, num_samples, legacy_fixed),
            ProcessPath::LegacySmoothing => self.run_planar(buffers, num_samples, legacy_smoothing),
        }

        if !path.is_legacy() {
            let num_channels = buffers.len().min(self.channels.len());
            let makeup = &mut self.makeup;
            if makeup.is_active() {
                for i in 0..num_samples {
                    let gain = makeup.advance();
                    for buf in buffers[..num_channels].iter_mut() {
                        buf.as_mut()[i] *= gain;
                    }
                }
            } else {
                let gain = makeup.target();
                for buf in buffers[..num_channels].iter_mut() {
                    for x in &mut buf.as_mut()[..num_samples] {
                        *x *= gain;
                    }
                }
            }
        }

        self.family_changed = false;
    }

    /// Process interleaved lane groups in place.
    ///
    /// The engine must hold at least `lanes.padded_channels()` channels;
    /// padding lanes run through their own (silent) channel state.
    pub fn process_lanes<const L: usize>(&mut self, lanes: &mut LaneBuffer<L>) {
        debug_assert!(self.channels.len() >= lanes.padded_channels());
        let path = self.begin_block();

        match path {
            ProcessPath::Classic(kind) => self.run_lanes(lanes, |ch, _, x| ch.process(kind, x)),
            ProcessPath::ClassicSmoothing(kind) => {
                self.run_lanes(lanes, |ch, c, x| classic_smoothing(kind, ch, c, x))
            }
            ProcessPath::Legacy => self.run_lanes(lanes, legacy_fixed),
            ProcessPath::LegacySmoothing => self.run_lanes(lanes, legacy_smoothing),
        }

        if !path.is_legacy() {
            let makeup = &mut self.makeup;
            if makeup.is_active() {
                for i in 0..lanes.num_samples() {
                    let gain = makeup.advance();
                    for group in 0..lanes.num_groups() {
                        for x in &mut lanes.group_mut(group)[i * L..(i + 1) * L] {
                            *x *= gain;
                        }
                    }
                }
            } else {
                let gain = makeup.target();
                for group in 0..lanes.num_groups() {
                    for x in lanes.group_mut(group) {
                        *x *= gain;
                    }
                }
            }
        }

        self.family_changed = false;
    }

    fn begin_block(&mut self) -> ProcessPath {
        let path = self.path();
        if let ProcessPath::Classic(_) = path {
            for (channel, controls) in self.channels.iter_mut().zip(&self.controls) {
                channel.coefficients = controls.cook(false);
            }
        }
        path
    }

    fn run_planar<C, K>(&mut self, buffers: &mut [C], num_samples: usize, mut kernel: K)
    where
        C: AsMut<[f64]>,
        K: FnMut(&mut ChannelState, &mut ControlSmoothers, f64) -> f64,
    {
        let states = self.channels.iter_mut().zip(self.controls.iter_mut());
        for (buf, (channel, controls)) in buffers.iter_mut().zip(states) {
            for x in &mut buf.as_mut()[..num_samples] {
                *x = kernel(channel, controls, *x);
            }
        }
    }

    fn run_lanes<const L: usize, K>(&mut self, lanes: &mut LaneBuffer<L>, mut kernel: K)
    where
        K: FnMut(&mut ChannelState, &mut ControlSmoothers, f64) -> f64,
    {
        let groups = self.channels.chunks_mut(L).zip(self.controls.chunks_mut(L));
        for (group, (channels, controls)) in groups.take(lanes.num_groups()).enumerate() {
            for frame in lanes.group_mut(group).chunks_exact_mut(L) {
                for ((x, channel), controls) in frame.iter_mut().zip(channels.iter_mut()).zip(controls.iter_mut()) {
                    *x = kernel(channel, controls, *x);
                }
            }
        }
    }

    fn recook(&mut self) {
        let legacy = self.mode.is_legacy();
        for (channel, controls) in self.channels.iter_mut().zip(&self.controls) {
            channel.coefficients = controls.cook(legacy);
        }
    }
}

#[inline]
fn classic_smoothing(
    kind: SolverKind,
    channel: &mut ChannelState,
    controls: &mut ControlSmoothers,
    x: f64,
) -> f64 {
    let (drive, width, saturation) = controls.advance();
    channel.coefficients = HysteresisCoefficients::cook(drive, width, saturation, false);
    channel.process(kind, x)
}

#[inline]
fn legacy_fixed(channel: &mut ChannelState, controls: &mut ControlSmoothers, x: f64) -> f64 {
    channel.coefficients = controls.cook(true);
    legacy::process_sample(channel, controls.width.current(), x)
}

#[inline]
fn legacy_smoothing(channel: &mut ChannelState, controls: &mut ControlSmoothers, x: f64) -> f64 {
    let (drive, width, saturation) = controls.advance();
    channel.coefficients = HysteresisCoefficients::cook(drive, width, saturation, true);
    legacy::process_sample(channel, width, x)
}
