#![cfg(test)]

use glam::DVec3;

use crate::{
    body_presets::stars::{the_sun, SUN_MASS},
    EngineConfig, Probe, SolarSystem, StateVectors, ASTRONOMICAL_UNIT, GRAVITATIONAL_CONSTANT,
};

mod polling;

mod chaining;
mod config;
mod integrator;

const SUN_MU: f64 = GRAVITATIONAL_CONSTANT * SUN_MASS;

const RANDOM_CASES: usize = 2000;

fn solar_system() -> SolarSystem {
    SolarSystem::new(EngineConfig::default()).expect("default solar system")
}

fn sun_only(config: EngineConfig) -> SolarSystem {
    SolarSystem::from_bodies(vec![the_sun()], config).expect("sun-only system")
}

/// A circular heliocentric orbit of one AU in the ecliptic, and its period.
fn circular_sun_orbit() -> (Probe, f64) {
    let speed = (SUN_MU / ASTRONOMICAL_UNIT).sqrt();
    let period = core::f64::consts::TAU * ASTRONOMICAL_UNIT / speed;

    (
        Probe::new(
            DVec3::new(ASTRONOMICAL_UNIT, 0.0, 0.0),
            DVec3::new(0.0, speed, 0.0),
        ),
        period,
    )
}

#[test]
fn state_vector_invariants() {
    let (probe, _) = circular_sun_orbit();
    let state: StateVectors = probe.state();

    let energy = state.specific_energy(SUN_MU);
    assertions::assert_relative_eq(
        energy,
        -SUN_MU / (2.0 * ASTRONOMICAL_UNIT),
        1e-12,
        "circular orbit energy",
    );

    let h = state.angular_momentum();
    assert_eq!(h.x, 0.0);
    assert_eq!(h.y, 0.0);
    assert!(h.z > 0.0);
}

#[test]
fn display_lists_every_body() {
    let system = solar_system();
    let text = system.to_string();

    for body in system.bodies() {
        assert!(text.contains(&body.name), "{} missing from {text}", body.name);
    }
}

#[test]
fn dominant_body_near_earth_is_earth() {
    let system = solar_system();
    let earth = system
        .position_at_time(crate::BodyId::Earth, 0.0)
        .expect("earth");

    assert_eq!(
        system.dominant_body_at(0.0, earth + DVec3::new(1e7, 0.0, 0.0)),
        crate::BodyId::Earth
    );
    assert_eq!(
        system.dominant_body_at(0.0, earth * 0.9),
        crate::BodyId::Sun
    );
}

#[test]
fn pull_points_at_the_body() {
    let system = solar_system();
    let position = DVec3::new(ASTRONOMICAL_UNIT, 0.0, 0.0);
    let pull = system
        .pull_at_time_and_position(crate::BodyId::Sun, 0.0, position)
        .expect("sun");

    assert!(pull.x < 0.0);
    assertions::assert_relative_eq(
        pull.length(),
        SUN_MU / (ASTRONOMICAL_UNIT * ASTRONOMICAL_UNIT),
        1e-12,
        "sun pull at 1 AU",
    );

    let magnitude = system
        .pull_magnitude_at_time_and_position(crate::BodyId::Sun, 0.0, position)
        .expect("sun");
    assertions::assert_relative_eq(magnitude, pull.length(), 1e-12, "sun pull magnitude");
}

#[test]
fn strongest_pull_picks_the_dominant_body() {
    let system = solar_system();
    let earth = system.position_at_time(crate::BodyId::Earth, 0.0).expect("earth");

    for position in [earth + DVec3::new(1e8, 0.0, 0.0), earth * 0.9, earth * 3.0] {
        let strongest = system
            .bodies()
            .iter()
            .map(|body| {
                let pull = system
                    .pull_magnitude_at_time_and_position(body.id, 0.0, position)
                    .expect("body");
                (body.id, pull)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        assert_eq!(strongest, Some(system.dominant_body_at(0.0, position)));
    }
}

#[test]
fn unknown_body_is_an_error() {
    let system = sun_only(EngineConfig::default());

    assert!(matches!(
        system.position_at_time(crate::BodyId::Mars, 0.0),
        Err(crate::EngineError::UnknownBody(crate::BodyId::Mars))
    ));
}

#[test]
fn duplicate_bodies_are_rejected() {
    let result = SolarSystem::from_bodies(vec![the_sun(), the_sun()], EngineConfig::default());

    assert!(matches!(result, Err(crate::EngineError::InvalidConfig(_))));
}

#[test]
fn planet_velocity_matches_orbital_speed() {
    let system = solar_system();
    let state = system.state_at_time(crate::BodyId::Earth, 0.0).expect("earth");

    // Vis-viva
    let r = state.position.length();
    let a = 1.00000261 * ASTRONOMICAL_UNIT;
    let expected = (SUN_MU * (2.0 / r - 1.0 / a)).sqrt();

    assertions::assert_relative_eq(state.velocity.length(), expected, 1e-3, "earth speed");
}
