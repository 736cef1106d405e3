//! User-facing parameters and the per-block snapshot.

use tapehyst_core::{BoolParam, ChoiceParam, FloatParam, ParamRef, PluginError, PluginResult};

use crate::mode::{TapeMode, MODE_NAMES};
use crate::oversampling::{OsFactor, OS_FACTOR_NAMES};

/// Parameter IDs.
pub mod ids {
    pub const ENABLED: &str = "hyst_on";
    pub const DRIVE: &str = "drive";
    pub const SATURATION: &str = "sat";
    pub const BIAS: &str = "width";
    pub const MODE: &str = "mode";
    pub const OVERSAMPLING: &str = "os";
}

/// All processor parameters.
///
/// Shared between the control side and the audio thread through an `Arc`;
/// every field is an atomic, so no locking is needed.
#[derive(Debug)]
pub struct HysteresisParams {
    pub enabled: BoolParam,
    pub drive: FloatParam,
    pub saturation: FloatParam,
    /// User-facing bias. The model's loop width is `1 - bias`.
    pub bias: FloatParam,
    pub mode: ChoiceParam,
    pub oversampling: ChoiceParam,
}

impl Default for HysteresisParams {
    fn default() -> Self {
        Self {
            enabled: BoolParam::new(ids::ENABLED, "Tape Hysteresis On/Off", true),
            drive: FloatParam::new(ids::DRIVE, "Tape Drive", 0.5, 0.0..=1.0),
            saturation: FloatParam::new(ids::SATURATION, "Tape Saturation", 0.5, 0.0..=1.0),
            bias: FloatParam::new(ids::BIAS, "Tape Bias", 0.5, 0.0..=1.0),
            mode: ChoiceParam::new(ids::MODE, "Tape Mode", &MODE_NAMES, TapeMode::default().index()),
            oversampling: ChoiceParam::new(
                ids::OVERSAMPLING,
                "Oversampling",
                &OS_FACTOR_NAMES,
                OsFactor::default().index(),
            ),
        }
    }
}

impl HysteresisParams {
    /// Read every parameter once. Called at the top of each block.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            enabled: self.enabled.get(),
            drive: self.drive.get(),
            saturation: self.saturation.get(),
            bias: self.bias.get(),
            mode_index: self.mode.index(),
            oversampling: OsFactor::from_index(self.oversampling.index()).unwrap_or_default(),
        }
    }

    /// Type-erased view of every parameter, in host order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ParamRef> {
        [
            &self.enabled as &dyn ParamRef,
            &self.drive,
            &self.saturation,
            &self.bias,
            &self.mode,
            &self.oversampling,
        ]
        .into_iter()
    }

    /// Look up a parameter by ID.
    pub fn by_id(&self, id: &str) -> Option<&dyn ParamRef> {
        self.iter().find(|p| p.id() == id)
    }

    /// Set a parameter's normalized value by ID.
    pub fn set_normalized(&self, id: &str, value: f64) -> PluginResult<()> {
        if !value.is_finite() {
            return Err(PluginError::ParameterError(format!("non-finite value for '{}'", id)));
        }
        let param = self
            .by_id(id)
            .ok_or_else(|| PluginError::ParameterError(format!("unknown parameter '{}'", id)))?;
        param.set_normalized(value);
        Ok(())
    }
}

/// Plain copy of every parameter for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub enabled: bool,
    pub drive: f64,
    pub saturation: f64,
    pub bias: f64,
    pub mode_index: usize,
    pub oversampling: OsFactor,
}

impl ParamSnapshot {
    /// Internal loop width.
    #[inline]
    pub fn width(&self) -> f64 {
        1.0 - self.bias
    }

    /// Selected mode. An out-of-range index falls back to the default mode.
    pub fn mode(&self) -> TapeMode {
        TapeMode::from_index(self.mode_index).unwrap_or_else(|| {
            debug_assert!(false, "tape mode index {} out of range", self.mode_index);
            TapeMode::default()
        })
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        HysteresisParams::default().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverKind;

    #[test]
    fn test_defaults() {
        let snap = ParamSnapshot::default();
        assert!(snap.enabled);
        assert_eq!(snap.drive, 0.5);
        assert_eq!(snap.saturation, 0.5);
        assert_eq!(snap.width(), 0.5);
        assert_eq!(snap.mode(), TapeMode::Classic(SolverKind::Rk2));
        assert_eq!(snap.oversampling, OsFactor::Two);
    }

    #[test]
    fn test_bias_maps_to_inverse_width() {
        let params = HysteresisParams::default();
        params.bias.set(0.8);
        assert!((params.snapshot().width() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_reflects_changes() {
        let params = HysteresisParams::default();
        params.mode.set_index(5);
        params.oversampling.set_index(4);
        params.enabled.set(false);
        let snap = params.snapshot();
        assert_eq!(snap.mode(), TapeMode::Legacy);
        assert_eq!(snap.oversampling, OsFactor::Sixteen);
        assert!(!snap.enabled);
    }

    #[test]
    fn test_lookup_by_id() {
        let params = HysteresisParams::default();
        assert_eq!(params.iter().count(), 6);
        let drive = params.by_id(ids::DRIVE).unwrap();
        drive.set_normalized(1.0);
        assert_eq!(params.drive.get(), 1.0);
        assert!(params.by_id("missing").is_none());
    }

    #[test]
    fn test_set_normalized_reports_bad_input() {
        let params = HysteresisParams::default();
        assert!(params.set_normalized(ids::MODE, 1.0).is_ok());
        assert_eq!(params.snapshot().mode(), TapeMode::Legacy);
        assert!(matches!(
            params.set_normalized("tape_speed", 0.5),
            Err(PluginError::ParameterError(_))
        ));
        assert!(params.set_normalized(ids::DRIVE, f64::NAN).is_err());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_out_of_range_mode_falls_back() {
        let snap = ParamSnapshot { mode_index: 42, ..ParamSnapshot::default() };
        assert_eq!(snap.mode(), TapeMode::default());
    }
}
