//! Jiles-Atherton magnetisation model.
//!
//! The model is evaluated as `dM/dt = f(M, H, dH/dt)`. The solvers also need
//! `df/dM`, which is computed analytically alongside `f` so both share the
//! Langevin evaluation.

use crate::coefficients::{HysteresisCoefficients, ALPHA};

/// Below this `|Q|` the Langevin function switches to its series expansion.
const LANGEVIN_SERIES_THRESHOLD: f64 = 1.0e-3;

/// Weight of the previous derivative in the alpha-transform differentiator.
const DIFF_ALPHA: f64 = 0.75;

/// Langevin function `L(Q) = coth(Q) - 1/Q` and its first two derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Langevin {
    pub value: f64,
    pub first: f64,
    pub second: f64,
}

impl Langevin {
    #[inline]
    pub fn eval(q: f64) -> Self {
        if q.abs() < LANGEVIN_SERIES_THRESHOLD {
            return Self {
                value: q / 3.0,
                first: 1.0 / 3.0,
                second: -2.0 * q / 15.0,
            };
        }

        let coth = 1.0 / q.tanh();
        let coth_sq = coth * coth;
        let q_inv = 1.0 / q;
        let q_inv_sq = q_inv * q_inv;

        Self {
            value: coth - q_inv,
            first: q_inv_sq - coth_sq + 1.0,
            second: 2.0 * coth * (coth_sq - 1.0) - 2.0 * q_inv_sq * q_inv,
        }
    }
}

/// Time derivative of the applied field, estimated with an alpha transform.
///
/// `sample_period` is the period at the oversampled rate.
#[inline]
pub fn field_derivative(h: f64, h_n1: f64, h_d_n1: f64, sample_period: f64) -> f64 {
    ((1.0 + DIFF_ALPHA) / sample_period) * (h - h_n1) - DIFF_ALPHA * h_d_n1
}

/// `dM/dt` at the given magnetisation, field and field derivative.
#[inline]
pub fn magnetisation_rate(m: f64, h: f64, h_d: f64, coeffs: &HysteresisCoefficients) -> f64 {
    evaluate(m, h, h_d, coeffs).0
}

/// `dM/dt` and its partial derivative with respect to `M`.
///
/// The direction indicator `delta_m` is piecewise constant and is held fixed
/// when differentiating.
#[inline]
pub fn magnetisation_rate_with_slope(
    m: f64,
    h: f64,
    h_d: f64,
    coeffs: &HysteresisCoefficients,
) -> (f64, f64) {
    let (rate, terms) = evaluate(m, h, h_d, coeffs);

    let d_m_diff = coeffs.m_s_oa_talpha * terms.langevin.first - 1.0;
    let d_irreversible = coeffs.nc * terms.delta_m * h_d * d_m_diff * (coeffs.nc * terms.delta * coeffs.k)
        / (terms.irreversible_den * terms.irreversible_den);
    let d_reversible = coeffs.m_s_oa_sq_tc_talpha * h_d * terms.langevin.second;
    let d_den = -coeffs.m_s_oa_sq_tc_talpha_sq * terms.langevin.second;

    let slope = (d_irreversible + d_reversible - rate * d_den) / terms.den;
    (rate, slope)
}

struct Terms {
    langevin: Langevin,
    delta: f64,
    delta_m: f64,
    irreversible_den: f64,
    den: f64,
}

#[inline]
fn evaluate(m: f64, h: f64, h_d: f64, coeffs: &HysteresisCoefficients) -> (f64, Terms) {
    let q = (h + ALPHA * m) / coeffs.a;
    let langevin = Langevin::eval(q);

    let m_diff = coeffs.m_s * langevin.value - m;
    let delta = if h_d >= 0.0 { 1.0 } else { -1.0 };
    let delta_m = if (delta < 0.0) == m_diff.is_sign_negative() { 1.0 } else { 0.0 };

    let irreversible_den = coeffs.nc * delta * coeffs.k - ALPHA * m_diff;
    let irreversible = coeffs.nc * delta_m * m_diff / irreversible_den * h_d;
    let reversible = coeffs.m_s_oa_tc * h_d * langevin.first;
    let den = 1.0 - coeffs.m_s_oa_tc_talpha * langevin.first;

    let rate = (irreversible + reversible) / den;
    (
        rate,
        Terms {
            langevin,
            delta,
            delta_m,
            irreversible_den,
            den,
        },
    )
}
