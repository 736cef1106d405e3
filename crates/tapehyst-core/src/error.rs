//! Error types for tapehyst.
//!
//! Errors only exist at setup time. Once `prepare` has succeeded, block
//! processing has no failure path.

use std::fmt;

/// Errors that can occur while configuring a processor.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginError {
    /// Processor initialization failed (invalid audio setup).
    InitializationFailed(String),
    /// A parameter value could not be applied.
    ParameterError(String),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Self::ParameterError(msg) => write!(f, "Parameter error: {}", msg),
        }
    }
}

impl std::error::Error for PluginError {}

/// Result type for tapehyst setup operations.
pub type PluginResult<T> = Result<T, PluginError>;
