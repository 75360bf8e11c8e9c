//! This module contains presets for stars.
//!
//! Only the Sun is needed: it anchors the heliocentric frame.

use glam::DVec3;

use crate::{BodyId, CelestialBody};

/// The mass of the Sun, in kilograms.
pub const SUN_MASS: f64 = 1.989e30;

/// The radius of the Sun, in meters.
pub const SUN_RADIUS: f64 = 7e8;

/// Returns the Sun, fixed at the origin of the heliocentric frame.
pub fn the_sun() -> CelestialBody {
    CelestialBody::fixed(BodyId::Sun, SUN_MASS, SUN_RADIUS, DVec3::ZERO)
}
