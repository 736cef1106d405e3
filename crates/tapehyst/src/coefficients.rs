//! Model coefficients "cooked" from the user controls.
//!
//! The three normalized controls map onto the physical parameters of the
//! magnetisation model: saturation magnetisation `M_s`, anhysteretic shape
//! `a`, reversibility `c` and coercivity `k`. Products that the model
//! evaluates on every call are cached here so the per-sample right-hand
//! side is a handful of multiplies.
//!
//! `cook` is continuous in every input. The smoothing paths call it once
//! per sample while controls ramp, so small control deltas must only ever
//! produce small coefficient deltas.

/// Mean-field coupling between domains.
pub const ALPHA: f64 = 1.6e-3;

/// Coercivity used by the classic solvers.
const CLASSIC_K: f64 = 0.47875;

/// Magnetisation above which a classic step is treated as diverged.
const CLASSIC_UPPER_LIMIT: f64 = 20.0;

const LEGACY_K: f64 = 27.0e3;
const LEGACY_C: f64 = 1.7e-1;
const LEGACY_MS_SCALE: f64 = 50_000.0;
const LEGACY_UPPER_LIMIT: f64 = 100_000.0;

/// Cooked model coefficients for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisCoefficients {
    /// Saturation magnetisation.
    pub m_s: f64,
    /// Anhysteretic shape parameter.
    pub a: f64,
    /// Reversible magnetisation ratio.
    pub c: f64,
    /// Coercivity.
    pub k: f64,
    /// `1 - c`
    pub nc: f64,
    /// `M_s / a`
    pub m_s_oa: f64,
    /// `alpha * M_s / a`
    pub m_s_oa_talpha: f64,
    /// `c * M_s / a`
    pub m_s_oa_tc: f64,
    /// `alpha * c * M_s / a`
    pub m_s_oa_tc_talpha: f64,
    /// `alpha * c * M_s / a^2`
    pub m_s_oa_sq_tc_talpha: f64,
    /// `alpha^2 * c * M_s / a^2`
    pub m_s_oa_sq_tc_talpha_sq: f64,
    /// Any step producing `|M|` above this is discarded.
    pub upper_limit: f64,
}

impl HysteresisCoefficients {
    /// Map drive, width and saturation (all in [0, 1]) to model coefficients.
    ///
    /// `width` is the internal width, i.e. `1 - bias` for the user-facing
    /// bias control. `legacy` selects the V1 constants, which work in a much
    /// larger magnetisation range.
    pub fn cook(drive: f64, width: f64, saturation: f64, legacy: bool) -> Self {
        let mut m_s = 0.5 + 1.5 * (1.0 - saturation);
        let mut a = m_s / (0.01 + 6.0 * drive);
        let mut c = (1.0 - width).max(0.0).sqrt() - 0.01;
        let mut k = CLASSIC_K;
        let mut upper_limit = CLASSIC_UPPER_LIMIT;

        if legacy {
            k = LEGACY_K;
            c = LEGACY_C;
            m_s *= LEGACY_MS_SCALE;
            a = m_s / (0.01 + 40.0 * drive);
            upper_limit = LEGACY_UPPER_LIMIT;
        }

        let m_s_oa = m_s / a;
        let m_s_oa_tc = c * m_s_oa;
        let m_s_oa_tc_talpha = ALPHA * m_s_oa_tc;
        let m_s_oa_sq_tc_talpha = m_s_oa_tc_talpha / a;

        Self {
            m_s,
            a,
            c,
            k,
            nc: 1.0 - c,
            m_s_oa,
            m_s_oa_talpha: ALPHA * m_s_oa,
            m_s_oa_tc,
            m_s_oa_tc_talpha,
            m_s_oa_sq_tc_talpha,
            m_s_oa_sq_tc_talpha_sq: ALPHA * m_s_oa_sq_tc_talpha,
            upper_limit,
        }
    }
}

impl Default for HysteresisCoefficients {
    fn default() -> Self {
        Self::cook(0.5, 0.5, 0.5, false)
    }
}

/// Output makeup gain for the given internal width and saturation.
///
/// Divides out the saturation magnetisation so perceived loudness holds
/// steady as saturation changes, with a mild boost for wider loops.
#[inline]
pub fn makeup_gain(width: f64, saturation: f64) -> f64 {
    (1.0 + 0.6 * width) / (0.5 + 1.5 * (1.0 - saturation))
}
