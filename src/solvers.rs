//! Conversions between the different anomalies of a Keplerian orbit.
//!
//! The elliptic anomalies are related through Kepler's equation:
//! ```text
//! M = E - e sin E
//! ```
//! and the hyperbolic ones through its hyperbolic counterpart:
//! ```text
//! M_h = e sinh H - H
//! ```
//! Neither has a closed-form inverse, so going from a mean anomaly to an
//! eccentric (or hyperbolic) anomaly is done numerically using
//! Newton-Raphson iteration. Every other conversion is closed-form.
//!
//! # Example
//! ```
//! use patched_conic_sim::solvers::{mean_to_true, true_to_mean};
//!
//! let eccentricity = 0.3;
//! let mean_anomaly = 1.2;
//!
//! let true_anomaly = mean_to_true(mean_anomaly, eccentricity);
//! let recovered = true_to_mean(true_anomaly, eccentricity);
//!
//! assert!((recovered - mean_anomaly).abs() < 1e-10);
//! ```

use core::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::{sinhcosh, wrap_angle};

/// The maximum number of iterations for the numerical approach algorithms.
///
/// This is used to prevent infinite loops in case the method fails to converge.
pub const NUMERIC_MAX_ITERS: u32 = 1000;

/// The step size below which a Newton-Raphson iteration is considered
/// to have converged.
pub const ANOMALY_TOLERANCE: f64 = 1e-10;

/// The result of a numeric anomaly solve.
///
/// Iterative solves are capped at [`NUMERIC_MAX_ITERS`] iterations.
/// When the cap is hit, the last estimate is still returned, but
/// `converged` is set to false so the caller can decide what to do with it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// The solved anomaly, in radians.
    pub value: f64,

    /// How many Newton-Raphson iterations were spent.
    pub iterations: u32,

    /// Whether the last step was smaller than [`ANOMALY_TOLERANCE`].
    pub converged: bool,
}

/// Solves Kepler's equation for the eccentric anomaly.
///
/// The mean anomaly is first normalized into [-π, π], so the returned
/// eccentric anomaly is also within [-π, π].
///
/// The iteration starts at `E₀ = M + e sin M` and takes Newton steps
/// `Δ = (M - (E - e sin E)) / (1 - e cos E)`. Since the root always
/// lies within `[M - e, M + e]`, the bracket is tightened on every step
/// and a step that would leave it is replaced by a bisection.
/// This keeps high-eccentricity, low-mean-anomaly cases from oscillating.
///
/// # Unchecked Operation
/// The eccentricity is expected to be within [0, 1).
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Solution {
    let mean_anomaly = wrap_angle(mean_anomaly);

    if eccentricity == 0.0 {
        return Solution {
            value: mean_anomaly,
            iterations: 0,
            converged: true,
        };
    }

    let mut low = mean_anomaly - eccentricity;
    let mut high = mean_anomaly + eccentricity;
    let mut anomaly = mean_anomaly + eccentricity * mean_anomaly.sin();

    for iteration in 1..=NUMERIC_MAX_ITERS {
        let (sin, cos) = anomaly.sin_cos();
        let residual = mean_anomaly - (anomaly - eccentricity * sin);

        // The residual shrinks as the anomaly grows
        if residual > 0.0 {
            low = anomaly;
        } else {
            high = anomaly;
        }

        let delta = residual / (1.0 - eccentricity * cos);
        let mut next = anomaly + delta;

        if !(next >= low && next <= high) {
            next = 0.5 * (low + high);
        }

        let step = next - anomaly;
        anomaly = next;

        if step.abs() < ANOMALY_TOLERANCE {
            return Solution {
                value: anomaly,
                iterations: iteration,
                converged: true,
            };
        }
    }

    Solution {
        value: anomaly,
        iterations: NUMERIC_MAX_ITERS,
        converged: false,
    }
}

/// Gets the initial guess for the hyperbolic anomaly.
///
/// Returns `sign(M) ln(2|M| / e + 1.8)`.
/// For large mean anomalies this tends towards the asymptotic solution
/// `ln(2M / e)`, and near zero it stays finite and on the convex side of
/// the hyperbolic Kepler equation, so Newton's method converges from it.
pub fn hyperbolic_initial_guess(mean_anomaly: f64, eccentricity: f64) -> f64 {
    mean_anomaly.signum() * (2.0 * mean_anomaly.abs() / eccentricity + 1.8).ln()
}

/// Solves the hyperbolic Kepler equation for the hyperbolic anomaly.
///
/// Uses the same Newton-Raphson scheme as the elliptic solver on
/// `M_h = e sinh H - H`, starting from [`hyperbolic_initial_guess`].
/// The equation is odd in `H`, so it is solved for `|M_h|` and the sign
/// is restored afterwards.
///
/// # Unchecked Operation
/// The eccentricity is expected to be above 1.
pub fn solve_hyperbolic_anomaly(mean_anomaly: f64, eccentricity: f64) -> Solution {
    let sign = mean_anomaly.signum();
    let target = mean_anomaly.abs();

    if target == 0.0 {
        return Solution {
            value: 0.0,
            iterations: 0,
            converged: true,
        };
    }

    let mut anomaly = hyperbolic_initial_guess(target, eccentricity);

    for iteration in 1..=NUMERIC_MAX_ITERS {
        let (sinh, cosh) = sinhcosh(anomaly);
        let residual = target - (eccentricity * sinh - anomaly);
        let delta = residual / (eccentricity * cosh - 1.0);
        anomaly += delta;

        if delta.abs() < ANOMALY_TOLERANCE {
            return Solution {
                value: sign * anomaly,
                iterations: iteration,
                converged: true,
            };
        }
    }

    Solution {
        value: sign * anomaly,
        iterations: NUMERIC_MAX_ITERS,
        converged: false,
    }
}

/// Converts an eccentric anomaly into a true anomaly.
///
/// Uses the half-angle identity
/// `tan(ν/2) = √((1 + e) / (1 - e)) tan(E/2)`,
/// written with `atan2` so it stays well-defined at `E = ±π`.
pub fn eccentric_to_true(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin, cos) = (eccentric_anomaly * 0.5).sin_cos();

    2.0 * ((1.0 + eccentricity).sqrt() * sin).atan2((1.0 - eccentricity).sqrt() * cos)
}

/// Converts a true anomaly into an eccentric anomaly.
pub fn true_to_eccentric(true_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin, cos) = (true_anomaly * 0.5).sin_cos();

    2.0 * ((1.0 - eccentricity).sqrt() * sin).atan2((1.0 + eccentricity).sqrt() * cos)
}

/// Converts an eccentric anomaly into a mean anomaly.
#[inline]
pub fn eccentric_to_mean(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
}

/// Converts a hyperbolic anomaly into a true anomaly.
pub fn hyperbolic_to_true(hyperbolic_anomaly: f64, eccentricity: f64) -> f64 {
    let (sinh, cosh) = sinhcosh(hyperbolic_anomaly * 0.5);

    2.0 * ((eccentricity + 1.0).sqrt() * sinh).atan2((eccentricity - 1.0).sqrt() * cosh)
}

/// Converts a true anomaly into a hyperbolic anomaly.
///
/// # Unchecked Operation
/// The true anomaly must be within the asymptotes of the hyperbola,
/// i.e. `|ν| < acos(-1 / e)`. Outside of them there is no point on
/// the trajectory and a non-finite value is returned.
pub fn true_to_hyperbolic(true_anomaly: f64, eccentricity: f64) -> f64 {
    let ratio = ((eccentricity - 1.0) / (eccentricity + 1.0)).sqrt();

    2.0 * (ratio * (true_anomaly * 0.5).tan()).atanh()
}

/// Converts a hyperbolic anomaly into a hyperbolic mean anomaly.
#[inline]
pub fn hyperbolic_to_mean(hyperbolic_anomaly: f64, eccentricity: f64) -> f64 {
    eccentricity * hyperbolic_anomaly.sinh() - hyperbolic_anomaly
}

/// Converts a mean anomaly into a true anomaly on an elliptic orbit.
///
/// The result is within (-π, π].
/// A warning is logged if the eccentric anomaly solve did not converge,
/// in which case the best estimate is used.
pub fn mean_to_true(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let solution = solve_eccentric_anomaly(mean_anomaly, eccentricity);

    if !solution.converged {
        log::warn!(
            "eccentric anomaly did not converge after {} iterations (M = {mean_anomaly}, e = {eccentricity})",
            solution.iterations
        );
    }

    eccentric_to_true(solution.value, eccentricity)
}

/// Converts a true anomaly into a mean anomaly on an elliptic orbit.
///
/// The result is within [-π, π].
pub fn true_to_mean(true_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_to_mean(true_to_eccentric(true_anomaly, eccentricity), eccentricity)
}

/// Converts a hyperbolic mean anomaly into a true anomaly.
///
/// A warning is logged if the hyperbolic anomaly solve did not converge.
pub fn mean_hyperbolic_to_true(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let solution = solve_hyperbolic_anomaly(mean_anomaly, eccentricity);

    if !solution.converged {
        log::warn!(
            "hyperbolic anomaly did not converge after {} iterations (M = {mean_anomaly}, e = {eccentricity})",
            solution.iterations
        );
    }

    hyperbolic_to_true(solution.value, eccentricity)
}

/// Converts a true anomaly into a hyperbolic mean anomaly.
///
/// See [`true_to_hyperbolic`] for the valid range of the true anomaly.
pub fn true_to_mean_hyperbolic(true_anomaly: f64, eccentricity: f64) -> f64 {
    hyperbolic_to_mean(true_to_hyperbolic(true_anomaly, eccentricity), eccentricity)
}

/// The true anomaly of the asymptotes of a hyperbolic trajectory.
///
/// Returns π for non-hyperbolic orbits.
pub fn asymptote_true_anomaly(eccentricity: f64) -> f64 {
    if eccentricity <= 1.0 {
        PI
    } else {
        (-1.0 / eccentricity).acos()
    }
}
