//! Parameter types with encapsulated atomic storage.
//!
//! Each parameter stores its value in an atomic so a control thread can
//! write while the audio thread reads. The audio thread reads every
//! parameter once per block and works from that snapshot; nothing in the
//! per-sample loops touches an atomic.
//!
//! # Example
//!
//! ```ignore
//! use tapehyst_core::params::{FloatParam, BoolParam, ChoiceParam};
//!
//! let drive = FloatParam::new("drive", "Tape Drive", 0.5, 0.0..=1.0);
//! let mode = ChoiceParam::new("mode", "Tape Mode", &["RK2", "RK4"], 0);
//!
//! drive.set(0.8);            // any thread
//! let d = drive.get();       // audio thread, once per block
//! ```

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::types::{ParamId, ParamValue};

// =============================================================================
// ParamRef Trait - Type-erased parameter access
// =============================================================================

/// Trait for type-erased parameter access at runtime.
///
/// Lets hosts and tests iterate over heterogeneous parameter collections.
/// All implementations are lock-free and `Send + Sync`.
pub trait ParamRef: Send + Sync {
    /// Get the parameter's unique ID.
    fn id(&self) -> ParamId;

    /// Get the parameter's display name.
    fn name(&self) -> &'static str;

    /// Get the step count (0 = continuous, 1 = toggle, >1 = discrete).
    fn step_count(&self) -> usize;

    /// Get the default normalized value.
    fn default_normalized(&self) -> ParamValue;

    /// Get the current normalized value (0.0-1.0).
    fn get_normalized(&self) -> ParamValue;

    /// Set the normalized value. Values are clamped to [0.0, 1.0].
    fn set_normalized(&self, value: ParamValue);
}

// =============================================================================
// FloatParam
// =============================================================================

/// Continuous parameter with a linear range.
#[derive(Debug)]
pub struct FloatParam {
    id: ParamId,
    name: &'static str,
    min: f64,
    max: f64,
    default: f64,
    /// Plain value stored as f64 bits
    value: AtomicU64,
}

impl FloatParam {
    /// Create a float parameter. `default` is clamped into `range`.
    pub fn new(id: ParamId, name: &'static str, default: f64, range: RangeInclusive<f64>) -> Self {
        let (min, max) = (*range.start(), *range.end());
        let default = default.clamp(min, max);
        Self {
            id,
            name,
            min,
            max,
            default,
            value: AtomicU64::new(default.to_bits()),
        }
    }

    /// Get the current plain value.
    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Set the plain value, clamped to the parameter range.
    #[inline]
    pub fn set(&self, value: f64) {
        let value = if value.is_nan() { self.default } else { value.clamp(self.min, self.max) };
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    /// The parameter's range as `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// The default plain value.
    pub fn default_value(&self) -> f64 {
        self.default
    }

    fn normalize(&self, plain: f64) -> f64 {
        if self.max > self.min {
            (plain - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }
}

impl ParamRef for FloatParam {
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn step_count(&self) -> usize {
        0
    }

    fn default_normalized(&self) -> ParamValue {
        self.normalize(self.default)
    }

    fn get_normalized(&self) -> ParamValue {
        self.normalize(self.get())
    }

    fn set_normalized(&self, value: ParamValue) {
        let t = value.clamp(0.0, 1.0);
        self.set(self.min + t * (self.max - self.min));
    }
}

// =============================================================================
// BoolParam
// =============================================================================

/// On/off switch.
#[derive(Debug)]
pub struct BoolParam {
    id: ParamId,
    name: &'static str,
    default: bool,
    value: AtomicBool,
}

impl BoolParam {
    /// Create a switch parameter.
    pub fn new(id: ParamId, name: &'static str, default: bool) -> Self {
        Self {
            id,
            name,
            default,
            value: AtomicBool::new(default),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
    }
}

impl ParamRef for BoolParam {
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn step_count(&self) -> usize {
        1
    }

    fn default_normalized(&self) -> ParamValue {
        if self.default {
            1.0
        } else {
            0.0
        }
    }

    fn get_normalized(&self) -> ParamValue {
        if self.get() {
            1.0
        } else {
            0.0
        }
    }

    fn set_normalized(&self, value: ParamValue) {
        self.set(value > 0.5);
    }
}

// =============================================================================
// ChoiceParam
// =============================================================================

/// Discrete choice from a fixed list of names.
///
/// Indices written through [`set_index`](Self::set_index) are clamped to the
/// list, so readers always see a valid index.
#[derive(Debug)]
pub struct ChoiceParam {
    id: ParamId,
    name: &'static str,
    choices: &'static [&'static str],
    default: usize,
    value: AtomicUsize,
}

impl ChoiceParam {
    /// Create a choice parameter. `choices` must not be empty.
    pub fn new(
        id: ParamId,
        name: &'static str,
        choices: &'static [&'static str],
        default: usize,
    ) -> Self {
        debug_assert!(!choices.is_empty(), "choice parameter needs at least one choice");
        let default = default.min(choices.len().saturating_sub(1));
        Self {
            id,
            name,
            choices,
            default,
            value: AtomicUsize::new(default),
        }
    }

    /// Get the selected index.
    #[inline]
    pub fn index(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }

    /// Select a choice by index, clamped to the list.
    #[inline]
    pub fn set_index(&self, index: usize) {
        let last = self.choices.len().saturating_sub(1);
        self.value.store(index.min(last), Ordering::Relaxed);
    }

    /// Name of the selected choice.
    pub fn selected_name(&self) -> &'static str {
        self.choices.get(self.index()).copied().unwrap_or("")
    }

    /// All choice names.
    pub fn choices(&self) -> &'static [&'static str] {
        self.choices
    }
}

impl ParamRef for ChoiceParam {
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn step_count(&self) -> usize {
        self.choices.len().saturating_sub(1)
    }

    fn default_normalized(&self) -> ParamValue {
        index_to_normalized(self.default, self.choices.len())
    }

    fn get_normalized(&self) -> ParamValue {
        index_to_normalized(self.index(), self.choices.len())
    }

    fn set_normalized(&self, value: ParamValue) {
        let steps = self.choices.len().saturating_sub(1);
        let index = (value.clamp(0.0, 1.0) * steps as f64).round() as usize;
        self.set_index(index);
    }
}

fn index_to_normalized(index: usize, count: usize) -> ParamValue {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}
