//! # tapehyst-core
//!
//! Real-time building blocks for the tapehyst processor.
//!
//! This crate is format-agnostic and has no external dependencies. It holds
//! everything the hysteresis processor needs that is not about hysteresis:
//! sample conversion at the block boundary, host buffer views, parameter
//! smoothing, the on/off crossfade and lock-free parameter storage.
//!
//! ## Types
//!
//! - [`Sample`] - f32/f64 host sample abstraction
//! - [`Buffer`] - Input/output channel view for one block
//! - [`Smoother`] - Linear parameter ramp
//! - [`BypassHandler`] - One-block on/off crossfade state machine
//! - [`FloatParam`], [`BoolParam`], [`ChoiceParam`] - Atomic parameters
//! - [`AudioSetup`] - Runtime configuration passed to `prepare`
//! - [`PluginError`] - Setup error type

pub mod buffer;
pub mod bypass;
pub mod config;
pub mod error;
pub mod params;
pub mod sample;
pub mod smoothing;
pub mod types;

// Re-exports for convenience
pub use buffer::Buffer;
pub use bypass::{BypassAction, BypassHandler, BypassState, CrossfadeCurve};
pub use config::{AudioSetup, PluginConfig};
pub use error::{PluginError, PluginResult};
pub use params::{BoolParam, ChoiceParam, FloatParam, ParamRef};
pub use sample::Sample;
pub use smoothing::Smoother;
pub use types::{ParamId, ParamValue, MAX_CHANNELS, MAX_OVERSAMPLING_FACTOR};
