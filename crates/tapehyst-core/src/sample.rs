//! Sample type abstraction for f32/f64 host buffers.
//!
//! The hysteresis engine always runs in `f64`. Host buffers may be either
//! width, so the block boundary converts through this trait and
//! monomorphizes the conversion away.

/// Trait for host audio sample types (f32, f64).
///
/// Only the operations needed at the block boundary are included: widening
/// into the `f64` working type and narrowing back.
///
/// # Example: Widening a channel
///
/// ```ignore
/// fn widen<S: Sample>(input: &[S], work: &mut [f64]) {
///     for (w, &x) in work.iter_mut().zip(input) {
///         *w = x.to_f64();
///     }
/// }
/// ```
pub trait Sample: Copy + Default + Send + Sync + 'static + PartialOrd {
    /// Convert from f64, narrowing if needed.
    fn from_f64(value: f64) -> Self;

    /// Convert to f64.
    fn to_f64(self) -> f64;
}

impl Sample for f32 {
    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_round_trip_through_f64() {
        let x = 0.123_456_7f32;
        assert_eq!(f32::from_f64(x.to_f64()), x);
    }

    #[test]
    fn test_f64_is_identity() {
        let x = 1.0 / 3.0;
        assert_eq!(f64::from_f64(x).to_f64(), x);
    }
}
