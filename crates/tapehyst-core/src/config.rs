//! Processor configuration.
//!
//! Two kinds of configuration exist:
//!
//! - [`PluginConfig`]: static, format-agnostic metadata (name, vendor, version)
//!   declared once as a `static`.
//! - [`AudioSetup`]: the runtime audio configuration handed to `prepare`
//!   once the host knows its sample rate, block size and channel count.
//!
//! # Example
//!
//! ```ignore
//! use tapehyst_core::PluginConfig;
//!
//! pub static CONFIG: PluginConfig = PluginConfig::new("Tape Hysteresis")
//!     .with_vendor("My Company")
//!     .with_version(env!("CARGO_PKG_VERSION"))
//!     .with_sub_categories("Fx|Distortion");
//! ```

use crate::error::{PluginError, PluginResult};
use crate::types::MAX_CHANNELS;

/// Format-agnostic processor metadata.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Name displayed in the host.
    pub name: &'static str,

    /// Vendor/company name.
    pub vendor: &'static str,

    /// Version string.
    pub version: &'static str,

    /// Category (e.g., "Fx").
    pub category: &'static str,

    /// Pipe-separated sub-categories like "Fx|Distortion".
    pub sub_categories: &'static str,
}

impl PluginConfig {
    /// Create a new configuration with default values.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            vendor: "Unknown Vendor",
            version: "1.0.0",
            category: "Fx",
            sub_categories: "",
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the version string.
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Set the category.
    pub const fn with_category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    /// Set the sub-categories.
    pub const fn with_sub_categories(mut self, sub_categories: &'static str) -> Self {
        self.sub_categories = sub_categories;
        self
    }
}

/// Runtime audio configuration passed to `prepare`.
///
/// Every per-channel container is sized from this once; block processing
/// never reallocates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioSetup {
    /// Sample rate in Hz (e.g., 44100.0, 48000.0, 96000.0)
    pub sample_rate: f64,
    /// Maximum number of samples per process() call
    pub max_buffer_size: usize,
    /// Number of audio channels
    pub num_channels: usize,
}

impl AudioSetup {
    /// Create a new audio setup.
    pub const fn new(sample_rate: f64, max_buffer_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_buffer_size,
            num_channels,
        }
    }

    /// Check that the setup describes a layout the processor can run.
    pub fn validate(&self) -> PluginResult<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(PluginError::InitializationFailed(format!(
                "invalid sample rate {}",
                self.sample_rate
            )));
        }
        if self.max_buffer_size == 0 {
            return Err(PluginError::InitializationFailed(
                "max buffer size must be non-zero".to_string(),
            ));
        }
        if self.num_channels == 0 || self.num_channels > MAX_CHANNELS {
            return Err(PluginError::InitializationFailed(format!(
                "channel count {} outside 1..={}",
                self.num_channels, MAX_CHANNELS
            )));
        }
        Ok(())
    }
}
