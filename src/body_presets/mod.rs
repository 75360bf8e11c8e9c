//! Preset bodies of the solar system.
//!
//! The masses and sizes are rounded values, good enough for a
//! visualization. The planets' orbits come from the approximate Keplerian
//! elements for 1800 AD to 2050 AD, valid to within a few arcminutes for
//! the inner planets.

pub mod planets;
pub mod stars;

use crate::{config::CacheConfig, error::Result, CelestialBody};

/// Builds the Sun and all eight planets, in [`BodyId::ALL`][crate::BodyId::ALL]
/// order, sampling every planet's orbit into a cache.
pub fn solar_system(config: &CacheConfig) -> Result<Vec<CelestialBody>> {
    let mut bodies = Vec::with_capacity(1 + planets::ALL.len());
    bodies.push(stars::the_sun());

    for preset in &planets::ALL {
        bodies.push(preset.build(stars::SUN_MASS, config)?);
    }

    Ok(bodies)
}
