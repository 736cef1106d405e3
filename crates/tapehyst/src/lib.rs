//! # tapehyst
//!
//! Magnetic tape hysteresis for real-time audio.
//!
//! The magnetisation of tape is modelled with the Jiles-Atherton equations
//! and integrated per sample at an oversampled rate by one of five solvers
//! (RK2, RK4, NR4, NR8, STN), or by the legacy V1 model with an explicit
//! bias tone. Drive, saturation and bias are smoothed so they can be
//! automated without zipper noise; switching the processor on or off
//! crossfades over one block.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tapehyst::{AudioSetup, Buffer, HysteresisParams, HysteresisPlugin};
//!
//! let params = Arc::new(HysteresisParams::default());
//! let mut processor = HysteresisPlugin::new(params.clone())
//!     .prepare(AudioSetup::new(48_000.0, 512, 2))?;
//!
//! params.drive.set(0.8);
//! let mut buffer = Buffer::new(inputs, outputs, 512);
//! processor.process(&mut buffer);
//! ```
//!
//! ## Modules
//!
//! - [`coefficients`] / [`model`] / [`solver`] - the magnetisation ODE
//! - [`state`] - per-channel solver state
//! - [`engine`] - smoothing and per-block path selection
//! - [`processor`] - clip, oversample, DC block and bypass around the engine

pub mod bias;
pub mod coefficients;
pub mod dc_blocker;
pub mod engine;
pub mod lanes;
pub mod legacy;
pub mod mode;
pub mod model;
pub mod oversampling;
pub mod params;
pub mod processor;
pub mod solver;
pub mod state;

pub use coefficients::{makeup_gain, HysteresisCoefficients};
pub use engine::{HysteresisEngine, ProcessPath};
pub use lanes::{LaneBuffer, LANE_WIDTH};
pub use mode::TapeMode;
pub use oversampling::{FirOversampler, OsFactor, Oversampler};
pub use params::{HysteresisParams, ParamSnapshot};
pub use processor::{HysteresisPlugin, HysteresisProcessor, ProcessorOptions, CONFIG, LATENCY_FUDGE};
pub use solver::SolverKind;
pub use state::{ChannelState, HysteresisState};

pub use tapehyst_core::{AudioSetup, Buffer, CrossfadeCurve, PluginError, PluginResult, Sample};
