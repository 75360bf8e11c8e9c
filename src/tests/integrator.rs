use glam::DVec3;

use super::{assertions::*, circular_sun_orbit, sun_only, SUN_MU};
use crate::{
    body_presets::{
        planets,
        stars::{the_sun, SUN_MASS},
    },
    config::{CacheConfig, IntegratorConfig, StepScheme},
    math::point_mass_acceleration,
    BodyId, EngineConfig, NBodyIntegrator, Probe, SolarSystem, ASTRONOMICAL_UNIT,
    SECONDS_PER_DAY,
};

fn sun_and(preset: planets::PlanetPreset) -> SolarSystem {
    let planet = preset
        .build(SUN_MASS, &CacheConfig::default())
        .expect("planet");

    SolarSystem::from_bodies(vec![the_sun(), planet], EngineConfig::default()).expect("system")
}

#[test]
fn two_body_orbit_conserves_invariants() {
    let system = sun_only(EngineConfig::default());
    let (probe, period) = circular_sun_orbit();

    let mut integrator = NBodyIntegrator::new(&system, IntegratorConfig::fixed_step(period / 200_000.0));
    let run = integrator.integrate(probe, 0.0, period);

    assert!(run.collision.is_none());
    assert_eq!(run.end_time, period);

    let initial = probe.state();
    let last = run.final_state.state();

    let energy = initial.specific_energy(SUN_MU);
    let drift = (last.specific_energy(SUN_MU) - energy) / energy;
    assert!(drift.abs() < 1e-3, "energy drifted by {drift}");

    let momentum = initial.angular_momentum().length();
    let drift = (last.angular_momentum().length() - momentum) / momentum;
    assert!(drift.abs() < 1e-3, "angular momentum drifted by {drift}");

    assert_relative_eq_vec3(last.position, initial.position, 1e-2, "position after one period");
}

#[test]
fn default_adaptive_run_conserves_invariants() {
    let system = sun_only(EngineConfig::default());
    let (probe, period) = circular_sun_orbit();

    let run = system.run_integration(probe, 0.0, period);

    assert!(run.collision.is_none());
    assert_relative_eq(run.end_time, period, 1e-12, "end time");

    let initial = probe.state();
    let last = run.final_state.state();

    let energy = initial.specific_energy(SUN_MU);
    let drift = (last.specific_energy(SUN_MU) - energy) / energy;
    assert!(drift.abs() < 1e-3, "energy drifted by {drift} over {} steps", run.steps);

    let momentum = initial.angular_momentum().length();
    let drift = (last.angular_momentum().length() - momentum) / momentum;
    assert!(drift.abs() < 1e-3, "angular momentum drifted by {drift} over {} steps", run.steps);
}

#[test]
fn velocity_verlet_conserves_invariants() {
    let system = sun_only(EngineConfig::default());
    let (probe, period) = circular_sun_orbit();

    let config = IntegratorConfig {
        scheme: StepScheme::VelocityVerlet,
        ..IntegratorConfig::fixed_step(period / 20_000.0)
    };
    let run = NBodyIntegrator::new(&system, config).integrate(probe, 0.0, period);

    let energy = probe.state().specific_energy(SUN_MU);
    let drift = (run.final_state.state().specific_energy(SUN_MU) - energy) / energy;
    assert!(drift.abs() < 1e-6, "energy drifted by {drift}");
}

#[test]
fn steps_are_longer_at_apoapsis() {
    let system = sun_only(EngineConfig::default());
    let config = IntegratorConfig {
        base_step: 1.0,
        max_step: 1e9,
        ..Default::default()
    };
    let max_turn = config.max_turn;
    let mut integrator = NBodyIntegrator::new(&system, config);
    integrator.refresh(0.0);

    let eccentricity = 0.5;
    let periapsis = 0.5 * ASTRONOMICAL_UNIT;
    let apoapsis = 1.5 * ASTRONOMICAL_UNIT;

    let probe_at = |position: DVec3, velocity: DVec3| Probe {
        position,
        velocity,
        acceleration: integrator.acceleration(position),
    };

    let fast = probe_at(
        DVec3::new(periapsis, 0.0, 0.0),
        DVec3::new(0.0, (SUN_MU * (1.0 + eccentricity) / periapsis).sqrt(), 0.0),
    );
    let slow = probe_at(
        DVec3::new(-apoapsis, 0.0, 0.0),
        DVec3::new(0.0, -(SUN_MU * (1.0 - eccentricity) / apoapsis).sqrt(), 0.0),
    );

    let at_periapsis = integrator.next_step_size(&fast);
    let at_apoapsis = integrator.next_step_size(&slow);

    assert_relative_eq(
        at_periapsis,
        max_turn * fast.velocity.length() / fast.acceleration.length(),
        1e-12,
        "step at periapsis",
    );
    assert_relative_eq(at_apoapsis / at_periapsis, 3.0, 1e-9, "apoapsis to periapsis step ratio");
}

#[test]
fn straight_lines_take_the_longest_step() {
    let system = sun_only(EngineConfig::default());
    let integrator = NBodyIntegrator::new(&system, IntegratorConfig::default());

    let falling = Probe {
        position: DVec3::new(ASTRONOMICAL_UNIT, 0.0, 0.0),
        velocity: DVec3::new(-1000.0, 0.0, 0.0),
        acceleration: DVec3::new(-0.006, 0.0, 0.0),
    };
    assert_eq!(integrator.next_step_size(&falling), SECONDS_PER_DAY);

    let hairpin = Probe {
        position: DVec3::ZERO,
        velocity: DVec3::new(1.0, 0.0, 0.0),
        acceleration: DVec3::new(0.0, 1e6, 0.0),
    };
    assert_eq!(integrator.next_step_size(&hairpin), 60.0);
}

/// One integrator with culling and one without, refreshed at J2000.
fn culled_and_summed(system: &SolarSystem) -> (NBodyIntegrator<'_>, NBodyIntegrator<'_>) {
    let mut culled = NBodyIntegrator::new(system, IntegratorConfig::default());
    let mut summed = NBodyIntegrator::new(
        system,
        IntegratorConfig {
            soi_culling: false,
            ..Default::default()
        },
    );
    culled.refresh(0.0);
    summed.refresh(0.0);

    (culled, summed)
}

#[test]
fn inner_bodies_are_culled_for_outer_probes() {
    let system = sun_and(planets::EARTH);
    let earth = system.position_at_time(BodyId::Earth, 0.0).expect("earth");
    let (culled, summed) = culled_and_summed(&system);

    let outside = earth.normalize() * 5.0 * ASTRONOMICAL_UNIT;
    let sun_pull = point_mass_acceleration(SUN_MU, -outside);
    assert_eq!(culled.acceleration(outside), sun_pull);
    assert_ne!(summed.acceleration(outside), sun_pull);

    let near = earth * 1.001;
    assert_eq!(culled.acceleration(near), summed.acceleration(near));
    assert_ne!(culled.acceleration(near), point_mass_acceleration(SUN_MU, -near));
}

#[test]
fn outer_bodies_are_never_culled() {
    let system = sun_and(planets::JUPITER);
    let jupiter = system.position_at_time(BodyId::Jupiter, 0.0).expect("jupiter");
    let (culled, summed) = culled_and_summed(&system);

    for inside in [
        jupiter.normalize() * ASTRONOMICAL_UNIT,
        -jupiter.normalize() * ASTRONOMICAL_UNIT,
    ] {
        let with_jupiter = culled.acceleration(inside);

        assert_eq!(with_jupiter, summed.acceleration(inside));
        assert_ne!(with_jupiter, point_mass_acceleration(SUN_MU, -inside));
    }
}

#[test]
fn excluded_bodies_exert_no_pull() {
    let system = sun_and(planets::EARTH);
    let earth = system.position_at_time(BodyId::Earth, 0.0).expect("earth");

    let mut integrator = NBodyIntegrator::new(
        &system,
        IntegratorConfig {
            excluded_bodies: vec![BodyId::Earth],
            soi_culling: false,
            ..Default::default()
        },
    );
    integrator.refresh(0.0);

    let position = earth + DVec3::new(1e7, 0.0, 0.0);
    assert_eq!(
        integrator.acceleration(position),
        point_mass_acceleration(SUN_MU, -position)
    );
}

#[test]
fn bodies_are_sorted_by_solar_distance() {
    let system = super::solar_system();
    let mut integrator = system.integrator();
    integrator.refresh(1e8);

    let distances: Vec<f64> = integrator
        .working_data()
        .iter()
        .map(|entry| entry.solar_distance)
        .collect();

    assert_eq!(integrator.working_data()[0].body.id, BodyId::Sun);
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
}

/// A probe 10,000 km from the Earth's center, falling straight in.
fn falling_probe(system: &SolarSystem) -> Probe {
    let earth = system.state_at_time(BodyId::Earth, 0.0).expect("earth");

    Probe::new(
        earth.position + DVec3::new(1e7, 0.0, 0.0),
        earth.velocity + DVec3::new(-3000.0, 0.0, 0.0),
    )
}

#[test]
fn collision_stops_the_run() {
    let system = sun_and(planets::EARTH);
    let config = IntegratorConfig {
        base_step: 1.0,
        max_step: 10.0,
        ..Default::default()
    };

    let run = NBodyIntegrator::new(&system, config).integrate(falling_probe(&system), 0.0, SECONDS_PER_DAY);

    let collision = run.collision.expect("the probe hits the Earth");
    assert_eq!(collision.body, BodyId::Earth);
    assert_eq!(run.end_time, collision.time);
    assert!(collision.time > 0.0 && collision.time < 2000.0, "hit at {}", collision.time);

    let earth = system.body(BodyId::Earth).expect("earth");
    let approach = run.closest_approach(BodyId::Earth).expect("approach");
    assert!(approach.distance <= earth.radius);
    assert_eq!(approach.time, collision.time);
    assert_eq!(run.samples.last().map(|sample| sample.time), Some(collision.time));
}

#[test]
fn collision_is_recorded_without_stopping() {
    let system = sun_and(planets::EARTH);
    let config = IntegratorConfig {
        base_step: 1.0,
        max_step: 10.0,
        stop_on_collision: false,
        excluded_bodies: vec![BodyId::Earth],
        ..Default::default()
    };

    let run = NBodyIntegrator::new(&system, config).integrate(falling_probe(&system), 0.0, 5000.0);

    assert_eq!(run.end_time, 5000.0);
    assert_eq!(run.collision.map(|hit| hit.body), Some(BodyId::Earth));

    // Passed close to the center
    let approach = run.closest_approach(BodyId::Earth).expect("approach");
    assert!(approach.distance < 1e6, "closest approach {}", approach.distance);
}

#[test]
fn integrates_backwards() {
    let system = sun_only(EngineConfig::default());
    let (probe, period) = circular_sun_orbit();

    let mut integrator = NBodyIntegrator::new(&system, IntegratorConfig::fixed_step(period / 100_000.0));
    let run = integrator.integrate(probe, 0.0, -0.25 * period);

    assert_eq!(run.end_time, -0.25 * period);
    assert_relative_eq_vec3(
        run.final_state.position,
        DVec3::new(0.0, -ASTRONOMICAL_UNIT, 0.0),
        1e-3,
        "a quarter orbit back",
    );
    assert!(run.samples.windows(2).all(|pair| pair[1].time < pair[0].time));
}

#[test]
fn output_is_downsampled() {
    let system = sun_only(EngineConfig::default());
    let (probe, period) = circular_sun_orbit();

    let config = IntegratorConfig {
        output_points: 10,
        ..IntegratorConfig::fixed_step(period / 1000.0)
    };
    let run = NBodyIntegrator::new(&system, config).integrate(probe, 0.0, period);

    assert!(run.steps >= 1000);
    assert!((10..=12).contains(&run.samples.len()), "{} samples", run.samples.len());
    assert_eq!(run.samples.first().map(|sample| sample.time), Some(0.0));
    assert_eq!(run.samples.last().map(|sample| sample.time), Some(period));
}

#[test]
fn step_cap_ends_the_run() {
    let system = sun_only(EngineConfig::default());
    let (probe, _) = circular_sun_orbit();

    let config = IntegratorConfig {
        max_steps: 10,
        ..IntegratorConfig::fixed_step(100.0)
    };
    let run = NBodyIntegrator::new(&system, config).integrate(probe, 0.0, 1e6);

    assert_eq!(run.steps, 10);
    assert_almost_eq(run.end_time, 1000.0, "end time");
}

#[test]
fn advance_applies_extra_acceleration() {
    let system = sun_only(EngineConfig::default());
    let thrust = DVec3::new(1.0, 0.0, 0.0);

    for (scheme, expected) in [(StepScheme::KickDrift, 150.0), (StepScheme::VelocityVerlet, 50.0)] {
        let config = IntegratorConfig {
            scheme,
            excluded_bodies: vec![BodyId::Sun],
            ..Default::default()
        };
        let mut integrator = NBodyIntegrator::new(&system, config);
        let mut probe = Probe::new(DVec3::new(ASTRONOMICAL_UNIT, 0.0, 0.0), DVec3::ZERO);

        let hit = integrator.advance(&mut probe, 0.0, 10.0, thrust);

        assert!(hit.is_none());
        assert_almost_eq_vec3(probe.velocity, DVec3::new(10.0, 0.0, 0.0), "velocity");
        assert_relative_eq(
            probe.position.x - ASTRONOMICAL_UNIT,
            expected,
            1e-6,
            &format!("{scheme:?} displacement"),
        );
    }
}
