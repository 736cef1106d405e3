//! Common types and limits used throughout tapehyst.

// =============================================================================
// Audio Buffer Limits
// =============================================================================
//
// These constants bound the storage sized during `prepare`. Buffers and
// per-channel state are allocated once from the host's declared layout and
// never grow on the audio thread.
// =============================================================================

/// Maximum number of audio channels the processor accepts.
///
/// Covers 22.2 surround (24 channels) with headroom. `prepare` rejects
/// layouts above this limit.
pub const MAX_CHANNELS: usize = 32;

/// Largest oversampling factor any oversampler may report.
///
/// Used to size oversampled working buffers at `prepare` time.
pub const MAX_OVERSAMPLING_FACTOR: usize = 16;

/// Parameter identifier.
pub type ParamId = &'static str;

/// Parameter value (normalized 0.0 to 1.0).
pub type ParamValue = f64;
