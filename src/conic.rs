//! Orbit determination: turning an instantaneous state into a conic.
//!
//! A [`Conic`] is the analytic two-body trajectory through a state vector,
//! relative to a single dominant mass. Once built it is immutable and can
//! be evaluated at any time, forwards or backwards from the state it was
//! built from.

use core::f64::consts::TAU;

use glam::{DQuat, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{DegenerateState, Result},
    math::{is_finite_vec, plane_alignment},
    solvers::{
        asymptote_true_anomaly, mean_hyperbolic_to_true, mean_to_true, true_to_mean,
        true_to_mean_hyperbolic,
    },
    StateVectors, GRAVITATIONAL_CONSTANT,
};

/// Conics whose eccentricity is this close to 1 are nudged away from the
/// parabolic case, which has no finite semi-major axis.
pub const PARABOLIC_TOLERANCE: f64 = 1e-4;

/// The eccentricity near-parabolic conics are nudged to.
pub const NUDGED_ECCENTRICITY: f64 = 1.0001;

/// Positions closer than this to the dominant body, in meters, are
/// considered to coincide with it.
const MIN_RADIUS: f64 = 1e-6;

/// A velocity whose angle from the radial direction has a sine below this
/// is considered purely radial.
const MIN_FLIGHT_PATH_SINE: f64 = 1e-12;

/// Keeps hyperbolic true anomalies strictly inside the asymptotes.
const ASYMPTOTE_MARGIN: f64 = 1e-9;

/// An analytic two-body trajectory around a dominant mass.
///
/// Positions and velocities going in and out of a conic are relative to
/// the dominant body.
///
/// The conic is described in its own orbital plane, where the angular
/// momentum points along +Z and motion is counter-clockwise. The
/// `orientation` quaternion takes that plane back into the reference
/// frame.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Conic {
    eccentricity: f64,
    semi_latus_rectum: f64,
    argument_adjustment: f64,
    reference_time: f64,
    mean_anomaly_at_reference: f64,
    mu: f64,
    normal: DVec3,
    orientation: DQuat,
    periapsis: f64,
    apoapsis: f64,
    energy: f64,
    mean_motion: f64,
}

/// A point sampled along a conic.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConicSample {
    /// Seconds since J2000.
    pub time: f64,
    /// Position relative to the dominant body, in meters.
    pub position: DVec3,
}

impl Conic {
    /// Determines the conic followed by a body at `position` moving at
    /// `velocity`, around a dominant body of `dominant_mass` kilograms that
    /// is at `dominant_position` moving at `dominant_velocity`.
    ///
    /// All vectors share the same frame; `epoch` is the time of the state,
    /// in seconds since J2000.
    ///
    /// # Errors
    /// Returns [`DegenerateState`] when the state has no well-defined conic:
    /// non-finite values, a non-positive mass, a position at the dominant
    /// body's center, or a velocity that is zero or purely radial.
    pub fn from_state_vector(
        position: DVec3,
        velocity: DVec3,
        dominant_mass: f64,
        dominant_position: DVec3,
        dominant_velocity: DVec3,
        epoch: f64,
    ) -> Result<Self> {
        Self::from_relative_state(
            StateVectors {
                position: position - dominant_position,
                velocity: velocity - dominant_velocity,
            },
            GRAVITATIONAL_CONSTANT * dominant_mass,
            epoch,
        )
    }

    /// Determines the conic through a state that is already relative to
    /// the dominant body, with gravitational parameter `mu`.
    ///
    /// See [`from_state_vector`][Self::from_state_vector] for the errors.
    ///
    /// # Example
    /// ```
    /// use glam::DVec3;
    /// use patched_conic_sim::{Conic, StateVectors};
    ///
    /// let state = StateVectors {
    ///     position: DVec3::new(1.0, 0.0, 0.0),
    ///     velocity: DVec3::new(0.0, 1.0, 0.0),
    /// };
    ///
    /// let conic = Conic::from_relative_state(state, 1.0, 0.0).unwrap();
    ///
    /// assert!(conic.eccentricity() < 1e-6);
    /// assert!((conic.period().unwrap() - std::f64::consts::TAU).abs() < 1e-6);
    /// ```
    pub fn from_relative_state(state: StateVectors, mu: f64, epoch: f64) -> Result<Self> {
        let StateVectors { position, velocity } = state;

        if !is_finite_vec(position) || !is_finite_vec(velocity) || !mu.is_finite() || !epoch.is_finite()
        {
            return Err(DegenerateState::NonFinite.into());
        }
        if mu <= 0.0 {
            return Err(DegenerateState::NonPositiveMu.into());
        }

        let radius = position.length();
        if radius < MIN_RADIUS {
            return Err(DegenerateState::ZeroRadius.into());
        }

        let speed = velocity.length();
        let angular_momentum = position.cross(velocity);
        let h = angular_momentum.length();
        if speed == 0.0 || h <= MIN_FLIGHT_PATH_SINE * radius * speed {
            return Err(DegenerateState::ZeroAngularMomentum.into());
        }

        let normal = angular_momentum / h;
        let to_plane = plane_alignment(normal);
        let planar_position = to_plane * position;

        let mut energy = 0.5 * speed * speed - mu / radius;

        // The periapsis and apoapsis are the roots of
        // 2εr² + 2μr - h² = 0, whose discriminant term is μe.
        let term = (mu * mu + 2.0 * h * h * energy).max(0.0).sqrt();
        let mut eccentricity = term / mu;
        if (eccentricity - 1.0).abs() < PARABOLIC_TOLERANCE {
            eccentricity = NUDGED_ECCENTRICITY;
            // Keep the energy consistent with the nudged shape: e² = 1 + 2h²ε/μ²
            energy = mu * mu * (eccentricity * eccentricity - 1.0) / (2.0 * h * h);
        }

        let semi_latus_rectum = h * h / mu;
        let periapsis = semi_latus_rectum / (1.0 + eccentricity);
        let apoapsis = semi_latus_rectum / (1.0 - eccentricity);

        let true_anomaly = if eccentricity < 1e-12 {
            0.0
        } else {
            let cos = ((semi_latus_rectum / radius - 1.0) / eccentricity).clamp(-1.0, 1.0);
            if position.dot(velocity) < 0.0 {
                -cos.acos()
            } else {
                cos.acos()
            }
        };

        let argument_adjustment = planar_position.y.atan2(planar_position.x) - true_anomaly;

        let semi_major_axis = semi_latus_rectum / (1.0 - eccentricity * eccentricity);
        let mean_motion = (mu / semi_major_axis.abs().powi(3)).sqrt();

        let mean_anomaly_at_reference = if eccentricity < 1.0 {
            true_to_mean(true_anomaly, eccentricity)
        } else {
            let limit = asymptote_true_anomaly(eccentricity) - ASYMPTOTE_MARGIN;
            true_to_mean_hyperbolic(true_anomaly.clamp(-limit, limit), eccentricity)
        };

        Ok(Self {
            eccentricity,
            semi_latus_rectum,
            argument_adjustment,
            reference_time: epoch,
            mean_anomaly_at_reference,
            mu,
            normal,
            orientation: to_plane.inverse(),
            periapsis,
            apoapsis,
            energy,
            mean_motion,
        })
    }

    /// The eccentricity.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// The semi-latus rectum `p`, in meters, such that `r = p / (1 + e cos ν)`.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_latus_rectum
    }

    /// The angle from the in-plane X axis to the periapsis, in radians.
    pub fn argument_adjustment(&self) -> f64 {
        self.argument_adjustment
    }

    /// The time the conic was determined at, in seconds since J2000.
    pub fn reference_time(&self) -> f64 {
        self.reference_time
    }

    /// The gravitational parameter of the dominant body, in m³/s².
    pub fn gravitational_parameter(&self) -> f64 {
        self.mu
    }

    /// The unit vector along the angular momentum.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// The rotation from the conic's plane into the reference frame.
    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    /// The periapsis distance, in meters.
    pub fn periapsis(&self) -> f64 {
        self.periapsis
    }

    /// The apoapsis distance, in meters.
    ///
    /// Negative for hyperbolic trajectories, which have no apoapsis.
    pub fn apoapsis(&self) -> f64 {
        self.apoapsis
    }

    /// The specific orbital energy, in J/kg.
    ///
    /// Always equal to `-μ / 2a`, including for nudged near-parabolic
    /// conics, whose energy is that of the nudged trajectory rather than
    /// the input state.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// The rate of change of the mean anomaly, in radians per second.
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// The semi-major axis, in meters. Negative for hyperbolic trajectories.
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_latus_rectum / (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Whether the trajectory escapes the dominant body.
    pub fn is_hyperbolic(&self) -> bool {
        self.eccentricity >= 1.0
    }

    /// The orbital period in seconds, or `None` for hyperbolic trajectories.
    pub fn period(&self) -> Option<f64> {
        if self.is_hyperbolic() {
            None
        } else {
            Some(TAU / self.mean_motion)
        }
    }

    /// The mean anomaly at `time` seconds since J2000.
    ///
    /// Not normalized, so hyperbolic mean anomalies keep their sign.
    pub fn mean_anomaly_at_time(&self, time: f64) -> f64 {
        self.mean_anomaly_at_reference + self.mean_motion * (time - self.reference_time)
    }

    /// The true anomaly at `time` seconds since J2000.
    pub fn true_anomaly_at_time(&self, time: f64) -> f64 {
        let mean_anomaly = self.mean_anomaly_at_time(time);

        if self.is_hyperbolic() {
            mean_hyperbolic_to_true(mean_anomaly, self.eccentricity)
        } else {
            mean_to_true(mean_anomaly, self.eccentricity)
        }
    }

    /// The distance from the dominant body at a true anomaly, in meters.
    pub fn radius_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.semi_latus_rectum / (1.0 + self.eccentricity * true_anomaly.cos())
    }

    /// The position relative to the dominant body at a true anomaly.
    pub fn position_at_true_anomaly(&self, true_anomaly: f64) -> DVec3 {
        let radius = self.radius_at_true_anomaly(true_anomaly);
        let (sin, cos) = (self.argument_adjustment + true_anomaly).sin_cos();

        self.orientation * DVec3::new(radius * cos, radius * sin, 0.0)
    }

    /// The velocity relative to the dominant body at a true anomaly.
    ///
    /// Uses the radial and tangential components
    /// `v_r = √(μ/p) e sin ν` and `v_t = √(μ/p) (1 + e cos ν)`.
    pub fn velocity_at_true_anomaly(&self, true_anomaly: f64) -> DVec3 {
        let scale = (self.mu / self.semi_latus_rectum).sqrt();
        let (sin_nu, cos_nu) = true_anomaly.sin_cos();
        let radial = scale * self.eccentricity * sin_nu;
        let tangential = scale * (1.0 + self.eccentricity * cos_nu);

        let (sin, cos) = (self.argument_adjustment + true_anomaly).sin_cos();

        self.orientation
            * DVec3::new(
                radial * cos - tangential * sin,
                radial * sin + tangential * cos,
                0.0,
            )
    }

    /// The position relative to the dominant body at `time` seconds since J2000.
    pub fn position_at_time(&self, time: f64) -> DVec3 {
        self.position_at_true_anomaly(self.true_anomaly_at_time(time))
    }

    /// The velocity relative to the dominant body at `time` seconds since J2000.
    pub fn velocity_at_time(&self, time: f64) -> DVec3 {
        self.velocity_at_true_anomaly(self.true_anomaly_at_time(time))
    }

    /// The relative state vectors at `time` seconds since J2000.
    pub fn state_at_time(&self, time: f64) -> StateVectors {
        let true_anomaly = self.true_anomaly_at_time(time);

        StateVectors {
            position: self.position_at_true_anomaly(true_anomaly),
            velocity: self.velocity_at_true_anomaly(true_anomaly),
        }
    }

    /// The time the trajectory, moving outwards, reaches `radius` meters
    /// from the dominant body.
    ///
    /// Returns `None` for elliptic conics, for radii the trajectory never
    /// reaches, and when the outbound crossing is before the reference time.
    pub fn outbound_time_at_radius(&self, radius: f64) -> Option<f64> {
        if !self.is_hyperbolic() || !radius.is_finite() || radius <= self.periapsis {
            return None;
        }

        let cos = ((self.semi_latus_rectum / radius - 1.0) / self.eccentricity).clamp(-1.0, 1.0);
        let limit = asymptote_true_anomaly(self.eccentricity) - ASYMPTOTE_MARGIN;
        let true_anomaly = cos.acos().min(limit);

        let mean_anomaly = true_to_mean_hyperbolic(true_anomaly, self.eccentricity);
        let time = self.reference_time
            + (mean_anomaly - self.mean_anomaly_at_reference) / self.mean_motion;

        (time > self.reference_time).then_some(time)
    }

    /// The end of the span a conic starting at `start` should be sampled over.
    ///
    /// Elliptic conics are sampled over one period, hyperbolic ones until
    /// they are `radius_limit` meters away from the dominant body. Either
    /// way, the span is capped at `max_horizon` seconds.
    pub fn sample_horizon(&self, start: f64, radius_limit: f64, max_horizon: f64) -> f64 {
        let span = match self.period() {
            Some(period) => period,
            None => self
                .outbound_time_at_radius(radius_limit)
                .map_or(max_horizon, |time| time - start),
        };

        start + span.clamp(0.0, max_horizon)
    }

    /// Samples `count` points uniformly over `[start, end]`, both included.
    pub fn sample(&self, start: f64, end: f64, count: usize) -> Vec<ConicSample> {
        let divisions = count.saturating_sub(1).max(1) as f64;

        (0..count)
            .map(|i| {
                let time = start + (end - start) * i as f64 / divisions;
                ConicSample {
                    time,
                    position: self.position_at_time(time),
                }
            })
            .collect()
    }
}
