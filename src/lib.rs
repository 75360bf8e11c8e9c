//! # Patched-Conic Solar System Simulation
//! This library crate computes where the bodies of the solar system are,
//! and how a spacecraft or asteroid moves between them.
//!
//! It combines three ways of getting a trajectory, from cheapest to most
//! expensive:
//! - **Ephemeris**: the planets follow Keplerian elements that drift
//!   slowly over the centuries. Their orbits are sampled once into an
//!   [`OrbitCache`], so looking a planet up is a single interpolation.
//! - **Patched conics**: a free-flying object follows a two-body [`Conic`]
//!   around whichever body pulls hardest on it. When another body takes
//!   over, the trajectory is re-anchored on a new conic around it. The
//!   result is a [`TrajectoryPath`] that can be evaluated at any time
//!   without stepping.
//! - **N-body integration**: when conics aren't good enough (close
//!   encounters, thrust, collisions), the [`NBodyIntegrator`] steps a
//!   [`Probe`] under the summed gravity of every body.
//!
//! ## Units
//! Positions are in meters, velocities in meters per second and masses in
//! kilograms. Time is measured in seconds since the J2000 epoch
//! (Julian Date 2451545.0); see the [`time`] module for conversions from
//! calendar dates.
//!
//! ## Getting started
//! The [`SolarSystem`] struct owns every body and answers every query:
//!
//! ```rust
//! use patched_conic_sim::{BodyId, EngineConfig, SolarSystem, ASTRONOMICAL_UNIT};
//!
//! # fn main() -> Result<(), patched_conic_sim::EngineError> {
//! let system = SolarSystem::new(EngineConfig::default())?;
//!
//! let earth = system.position_at_time(BodyId::Earth, 0.0)?;
//! let distance = earth.length() / ASTRONOMICAL_UNIT;
//!
//! assert!((0.98..1.02).contains(&distance));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod body;
pub mod body_presets;
pub mod config;
pub mod conic;
pub mod ephemeris;
pub mod error;
pub mod integrator;
pub mod math;
pub mod orbit_cache;
pub mod patched_conics;
pub mod scenarios;
pub mod solvers;
mod system;
pub mod time;

use glam::{DVec2, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use body::{BodyId, CelestialBody, Motion};
pub use config::EngineConfig;
pub use conic::Conic;
pub use error::{DegenerateState, EngineError};
pub use integrator::{IntegrationRun, NBodyIntegrator, Probe};
pub use orbit_cache::OrbitCache;
pub use patched_conics::{ConicSection, PathEnd, TrajectoryPath};
pub use system::SolarSystem;

/// The gravitational constant, in m³ kg⁻¹ s⁻².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// The astronomical unit, in meters.
pub const ASTRONOMICAL_UNIT: f64 = 149_597_870_700.0;

/// The Julian Date of the J2000 epoch.
pub const J2000_JULIAN_DATE: f64 = 2_451_545.0;

/// Days in a Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Seconds in a day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Seconds in a Julian century.
pub const SECONDS_PER_CENTURY: f64 = DAYS_PER_CENTURY * SECONDS_PER_DAY;

/// A struct representing a 3x2 matrix.
///
/// This struct is used to store the transformation matrix
/// for transforming a 2D vector into a 3D vector.
///
/// Namely, it is used by the ephemeris to tilt a position in the
/// orbital plane into the ecliptic frame.
///
/// Each element is named `eXY`, where `X` is the row and `Y` is the column.
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
///
/// use patched_conic_sim::Matrix3x2;
///
/// let matrix = Matrix3x2 {
///    e11: 1.0, e12: 0.0,
///    e21: 0.0, e22: 1.0,
///    e31: 1.0, e32: 1.0,
/// };
///
/// let result = matrix.dot_vec(DVec2::new(1.0, 2.0));
///
/// assert_eq!(result, DVec3::new(1.0, 2.0, 3.0));
/// ```
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3x2 {
    // Element XY
    pub e11: f64,
    pub e12: f64,
    pub e21: f64,
    pub e22: f64,
    pub e31: f64,
    pub e32: f64,
}

impl Matrix3x2 {
    /// Computes a dot product between this matrix and a 2D vector.
    pub fn dot_vec(&self, vec: DVec2) -> DVec3 {
        DVec3::new(
            vec.x * self.e11 + vec.y * self.e12,
            vec.x * self.e21 + vec.y * self.e22,
            vec.x * self.e31 + vec.y * self.e32,
        )
    }
}

/// A position and a velocity.
///
/// The position is in meters, the velocity in meters per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateVectors {
    /// The position, in meters.
    pub position: DVec3,
    /// The velocity, in meters per second.
    pub velocity: DVec3,
}

impl StateVectors {
    /// Determines the conic through these state vectors, taken relative
    /// to a body with gravitational parameter `mu`, at `epoch` seconds
    /// since J2000.
    ///
    /// See [`Conic::from_relative_state`].
    pub fn to_conic(self, mu: f64, epoch: f64) -> error::Result<Conic> {
        Conic::from_relative_state(self, mu, epoch)
    }

    /// The specific orbital energy `v²/2 - μ/r` around a body at the
    /// origin with gravitational parameter `mu`, in J/kg.
    pub fn specific_energy(&self, mu: f64) -> f64 {
        0.5 * self.velocity.length_squared() - mu / self.position.length()
    }

    /// The specific angular momentum `r × v` around the origin, in m²/s.
    pub fn angular_momentum(&self) -> DVec3 {
        self.position.cross(self.velocity)
    }
}

#[cfg(test)]
mod tests;
