//! Numerical solvers for the magnetisation ODE.
//!
//! Every solver advances the magnetisation by one oversampled sample given
//! the previous state, the new field `H` and its derivative. The solvers are
//! plain functions selected through [`SolverKind`]; the match is resolved
//! once per call, which the optimizer hoists out of the sample loops.

use crate::coefficients::HysteresisCoefficients;
use crate::model::{magnetisation_rate, magnetisation_rate_with_slope};

/// Divisor applied to the sample period by the Newton-Raphson solvers.
const NR_PERIOD_DIVISOR: f64 = 1.9;

/// Solver variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// Second-order Runge-Kutta (midpoint).
    Rk2,
    /// Fourth-order Runge-Kutta.
    Rk4,
    /// Newton-Raphson on the trapezoidal rule, 4 iterations.
    Nr4,
    /// Newton-Raphson on the trapezoidal rule, 8 iterations.
    Nr8,
    /// State-transition network: one linearised implicit midpoint step.
    Stn,
}

impl SolverKind {
    pub const ALL: [SolverKind; 5] = [
        SolverKind::Rk2,
        SolverKind::Rk4,
        SolverKind::Nr4,
        SolverKind::Nr8,
        SolverKind::Stn,
    ];

    /// Input ceiling applied before this solver sees a block.
    pub fn clip_level(self) -> f64 {
        match self {
            SolverKind::Rk2 | SolverKind::Rk4 => 10.0,
            SolverKind::Nr4 | SolverKind::Nr8 => 12.5,
            SolverKind::Stn => 20.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Rk2 => "RK2",
            SolverKind::Rk4 => "RK4",
            SolverKind::Nr4 => "NR4",
            SolverKind::Nr8 => "NR8",
            SolverKind::Stn => "STN",
        }
    }
}

/// Inputs shared by all solvers for one step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    /// Previous magnetisation.
    pub m_n1: f64,
    /// Previous field.
    pub h_n1: f64,
    /// Previous field derivative.
    pub h_d_n1: f64,
    /// New field.
    pub h: f64,
    /// New field derivative.
    pub h_d: f64,
    /// Oversampled sample period.
    pub period: f64,
}

/// Advance the magnetisation by one sample with the given solver.
#[inline]
pub fn solve(kind: SolverKind, input: &StepInput, coeffs: &HysteresisCoefficients) -> f64 {
    match kind {
        SolverKind::Rk2 => rk2(input, coeffs),
        SolverKind::Rk4 => rk4(input, coeffs),
        SolverKind::Nr4 => newton_raphson::<4>(input, coeffs),
        SolverKind::Nr8 => newton_raphson::<8>(input, coeffs),
        SolverKind::Stn => state_transition(input, coeffs),
    }
}

#[inline]
fn rk2(s: &StepInput, coeffs: &HysteresisCoefficients) -> f64 {
    let k1 = s.period * magnetisation_rate(s.m_n1, s.h_n1, s.h_d_n1, coeffs);
    let k2 = s.period
        * magnetisation_rate(
            s.m_n1 + k1 * 0.5,
            (s.h + s.h_n1) * 0.5,
            (s.h_d + s.h_d_n1) * 0.5,
            coeffs,
        );
    s.m_n1 + k2
}

#[inline]
fn rk4(s: &StepInput, coeffs: &HysteresisCoefficients) -> f64 {
    let h_mid = (s.h + s.h_n1) * 0.5;
    let h_d_mid = (s.h_d + s.h_d_n1) * 0.5;

    let k1 = s.period * magnetisation_rate(s.m_n1, s.h_n1, s.h_d_n1, coeffs);
    let k2 = s.period * magnetisation_rate(s.m_n1 + k1 * 0.5, h_mid, h_d_mid, coeffs);
    let k3 = s.period * magnetisation_rate(s.m_n1 + k2 * 0.5, h_mid, h_d_mid, coeffs);
    let k4 = s.period * magnetisation_rate(s.m_n1 + k3, s.h, s.h_d, coeffs);

    s.m_n1 + k1 / 6.0 + k2 / 3.0 + k3 / 3.0 + k4 / 6.0
}

#[inline]
fn newton_raphson<const ITERS: usize>(s: &StepInput, coeffs: &HysteresisCoefficients) -> f64 {
    let t_alpha = s.period / NR_PERIOD_DIVISOR;
    let rate_n1 = magnetisation_rate(s.m_n1, s.h_n1, s.h_d_n1, coeffs);

    let mut m = s.m_n1;
    for _ in 0..ITERS {
        let (rate, slope) = magnetisation_rate_with_slope(m, s.h, s.h_d, coeffs);
        let residual = m - s.m_n1 - t_alpha * (rate + rate_n1);
        let jacobian = 1.0 - t_alpha * slope;
        m -= residual / jacobian;
    }
    m
}

#[inline]
fn state_transition(s: &StepInput, coeffs: &HysteresisCoefficients) -> f64 {
    let h_mid = (s.h + s.h_n1) * 0.5;
    let h_d_mid = (s.h_d + s.h_d_n1) * 0.5;
    let (rate, slope) = magnetisation_rate_with_slope(s.m_n1, h_mid, h_d_mid, coeffs);
    s.m_n1 + s.period * rate / (1.0 - 0.5 * s.period * slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field_derivative;

    const PERIOD: f64 = 1.0 / 96_000.0;

    fn sweep(kind: SolverKind, coeffs: &HysteresisCoefficients, amplitude: f64) -> Vec<f64> {
        let (mut m, mut h_n1, mut h_d_n1) = (0.0, 0.0, 0.0);
        (0..2000)
            .map(|n| {
                let h = amplitude * (2.0 * std::f64::consts::PI * 200.0 * n as f64 * PERIOD).sin();
                let h_d = field_derivative(h, h_n1, h_d_n1, PERIOD);
                let input = StepInput { m_n1: m, h_n1, h_d_n1, h, h_d, period: PERIOD };
                m = solve(kind, &input, coeffs);
                h_n1 = h;
                h_d_n1 = h_d;
                m
            })
            .collect()
    }

    #[test]
    fn test_clip_levels() {
        assert_eq!(SolverKind::Rk2.clip_level(), 10.0);
        assert_eq!(SolverKind::Rk4.clip_level(), 10.0);
        assert_eq!(SolverKind::Nr4.clip_level(), 12.5);
        assert_eq!(SolverKind::Nr8.clip_level(), 12.5);
        assert_eq!(SolverKind::Stn.clip_level(), 20.0);
    }

    #[test]
    fn test_zero_field_stays_demagnetised() {
        let coeffs = HysteresisCoefficients::default();
        let input = StepInput { m_n1: 0.0, h_n1: 0.0, h_d_n1: 0.0, h: 0.0, h_d: 0.0, period: PERIOD };
        for kind in SolverKind::ALL {
            assert_eq!(solve(kind, &input, &coeffs), 0.0, "{}", kind.name());
        }
    }

    #[test]
    fn test_solvers_agree_on_smooth_input() {
        let coeffs = HysteresisCoefficients::default();
        let reference = sweep(SolverKind::Rk4, &coeffs, 0.5);
        let peak = reference.iter().fold(0.0, |acc: f64, m| acc.max(m.abs()));
        assert!(peak > 0.1);
        for kind in SolverKind::ALL {
            let out = sweep(kind, &coeffs, 0.5);
            let max_err = out
                .iter()
                .zip(&reference)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            assert!(max_err < 0.1 * peak, "{} diverged from RK4 by {max_err}", kind.name());
        }
    }

    #[test]
    fn test_magnetisation_follows_field_sign() {
        let coeffs = HysteresisCoefficients::default();
        let out = sweep(SolverKind::Rk2, &coeffs, 1.0);
        // Quarter period of 200 Hz at 96 kHz is 120 samples
        assert!(out[120] > 0.0);
        assert!(out[360] < 0.0);
    }
}
