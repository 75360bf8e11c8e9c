use core::fmt;

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::CacheConfig,
    ephemeris::{position_at, OrbitalElements},
    error::Result,
    orbit_cache::OrbitCache,
    time::seconds_to_centuries,
    ASTRONOMICAL_UNIT, GRAVITATIONAL_CONSTANT,
};

/// Identifies one of the bodies of the solar system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum BodyId {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl BodyId {
    /// Every body, the Sun first and then the planets outwards.
    pub const ALL: [BodyId; 9] = [
        BodyId::Sun,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Earth,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
    ];

    /// The display name of the body.
    pub const fn name(self) -> &'static str {
        match self {
            BodyId::Sun => "Sun",
            BodyId::Mercury => "Mercury",
            BodyId::Venus => "Venus",
            BodyId::Earth => "Earth",
            BodyId::Mars => "Mars",
            BodyId::Jupiter => "Jupiter",
            BodyId::Saturn => "Saturn",
            BodyId::Uranus => "Uranus",
            BodyId::Neptune => "Neptune",
        }
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a body moves.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Motion {
    /// The body stays at a fixed heliocentric position, in meters.
    Fixed(DVec3),

    /// The body follows an ephemeris, sampled into a cache.
    Orbiting {
        /// The elements the ephemeris is evaluated from.
        elements: OrbitalElements,
        /// The sampled orbit.
        cache: OrbitCache,
    },
}

/// A struct representing a celestial body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CelestialBody {
    /// Which body this is.
    pub id: BodyId,

    /// The name of the celestial body.
    pub name: String,

    /// The mass of the celestial body, in kilograms.
    pub mass: f64,

    /// The radius of the celestial body, in meters.
    pub radius: f64,

    /// The radius of the sphere of influence, in meters.
    ///
    /// Infinite for a body that doesn't orbit anything.
    pub soi_radius: f64,

    /// How the body moves.
    pub motion: Motion,
}

impl CelestialBody {
    /// Creates a body that stays at a fixed position.
    pub fn fixed(id: BodyId, mass: f64, radius: f64, position: DVec3) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            mass,
            radius,
            soi_radius: f64::INFINITY,
            motion: Motion::Fixed(position),
        }
    }

    /// Creates a body orbiting a central mass of `central_mass` kilograms,
    /// sampling its orbit into a cache.
    ///
    /// The sphere of influence is `a (m / M)^(2/5)`, using the semi-major
    /// axis at J2000.
    pub fn orbiting(
        id: BodyId,
        mass: f64,
        radius: f64,
        central_mass: f64,
        elements: OrbitalElements,
        config: &CacheConfig,
    ) -> Result<Self> {
        let semi_major_axis = elements.semi_major_axis.initial * ASTRONOMICAL_UNIT;
        let soi_radius = semi_major_axis * (mass / central_mass).powf(0.4);
        let cache = OrbitCache::build(&elements, config)?;

        Ok(Self {
            id,
            name: id.name().to_string(),
            mass,
            radius,
            soi_radius,
            motion: Motion::Orbiting { elements, cache },
        })
    }

    /// The gravitational parameter `GM`, in m³/s².
    #[inline]
    pub fn mu(&self) -> f64 {
        GRAVITATIONAL_CONSTANT * self.mass
    }

    /// The cached heliocentric position at `time` seconds since J2000.
    pub fn position_at_time(&self, time: f64) -> DVec3 {
        match &self.motion {
            Motion::Fixed(position) => *position,
            Motion::Orbiting { cache, .. } => cache.query(time),
        }
    }

    /// The heliocentric position straight from the ephemeris, bypassing
    /// the cache.
    pub fn exact_position_at_time(&self, time: f64) -> DVec3 {
        match &self.motion {
            Motion::Fixed(position) => *position,
            Motion::Orbiting { elements, .. } => {
                position_at(elements, seconds_to_centuries(time)).0 * ASTRONOMICAL_UNIT
            }
        }
    }

    /// The orbit cache, if the body moves.
    pub fn cache(&self) -> Option<&OrbitCache> {
        match &self.motion {
            Motion::Fixed(_) => None,
            Motion::Orbiting { cache, .. } => Some(cache),
        }
    }
}
