use glam::DVec3;

use super::{assertions::*, solar_system, SUN_MU};
use crate::{
    config::ChainConfig,
    patched_conics::find_handover,
    BodyId::{self, *},
    Conic, DegenerateState, EngineConfig, EngineError, PathEnd, SolarSystem, StateVectors,
    SECONDS_PER_DAY,
};

#[test]
fn handover_needs_confirmation() {
    let dominants = [Sun, Sun, Earth, Sun, Earth, Earth, Earth];
    assert_eq!(find_handover(&dominants, Sun, 3), Some((4, Earth)));
    assert_eq!(find_handover(&dominants, Sun, 1), Some((2, Earth)));
    assert_eq!(find_handover(&dominants, Sun, 4), None);
}

#[test]
fn handover_skips_first_sample() {
    let dominants = [Earth, Earth, Earth, Sun];
    assert_eq!(find_handover(&dominants, Sun, 2), Some((1, Earth)));
}

#[test]
fn handover_resets_on_flicker() {
    let dominants = [Sun, Mars, Earth, Mars, Earth, Sun];
    assert_eq!(find_handover(&dominants, Sun, 2), None);

    let dominants = [Sun, Mars, Earth, Earth, Earth];
    assert_eq!(find_handover(&dominants, Sun, 3), Some((2, Earth)));
}

#[test]
fn handover_of_nothing() {
    let empty: [BodyId; 0] = [];
    assert_eq!(find_handover(&empty, Sun, 1), None);
    assert_eq!(find_handover(&[Venus], Sun, 1), None);
}

#[test]
fn low_earth_orbit_stays_put() {
    let system = solar_system();
    let earth = system.state_at_time(Earth, 0.0).expect("earth");
    let earth_mu = system.body(Earth).expect("earth").mu();

    let radius = 7e6;
    let position = earth.position + DVec3::new(radius, 0.0, 0.0);
    let velocity = earth.velocity + DVec3::new(0.0, (earth_mu / radius).sqrt(), 0.0);

    let path = system
        .build_trajectory(position, velocity, 0.0)
        .expect("trajectory");

    assert_eq!(path.sections.len(), 1);
    assert_eq!(path.end, PathEnd::OpenEnded);

    let section = &path.sections[0];
    assert_eq!(section.dominant_body, Earth);
    assert_eq!(section.origination, None);
    assert_eq!(section.termination, None);
    assert!(section.is_narrowed());
    assert!(section.conic.eccentricity() < 1e-3);
}

/// A heliocentric state that passes 5e7 m from the Earth at `flyby`
/// seconds since J2000, moving away from the Sun at 2 km/s relative to
/// it, propagated back by `lead` seconds on a Sun-only conic.
fn earth_flyby(system: &SolarSystem, flyby: f64, lead: f64) -> StateVectors {
    let earth = system.state_at_time(Earth, flyby).expect("earth");

    let at_flyby = StateVectors {
        position: earth.position + DVec3::new(0.0, 0.0, 5e7),
        velocity: earth.velocity + earth.position.normalize() * 2000.0,
    };

    at_flyby
        .to_conic(SUN_MU, flyby)
        .expect("heliocentric conic")
        .state_at_time(flyby - lead)
}

#[test]
fn flyby_hands_over_to_earth() {
    let system = solar_system();
    let flyby = 100.0 * SECONDS_PER_DAY;
    let start = flyby - 20.0 * SECONDS_PER_DAY;
    let initial = earth_flyby(&system, flyby, 20.0 * SECONDS_PER_DAY);

    assert_eq!(system.dominant_body_at(start, initial.position), Sun);

    let path = system
        .build_trajectory(initial.position, initial.velocity, start)
        .expect("trajectory");

    assert_eq!(path.sections.len(), 2, "{path:#?}");
    assert_eq!(path.end, PathEnd::SectionLimit);

    let (first, second) = (&path.sections[0], &path.sections[1]);
    assert_eq!(first.dominant_body, Sun);
    assert_eq!(second.dominant_body, Earth);

    assert_eq!(first.origination, None);
    assert_eq!(first.termination, second.origination);

    let handover = first.termination.expect("handover time");
    assert!(
        (handover - flyby).abs() < 3.0 * SECONDS_PER_DAY,
        "handover {} days from the flyby",
        (handover - flyby) / SECONDS_PER_DAY
    );
    assert!(second.termination.expect("exit time") > handover);

    // Narrowed sections end on their bounds
    let samples = first.samples();
    assert_eq!(samples.first().map(|sample| sample.time), Some(start));
    let last = samples.last().expect("samples").time;
    assert_relative_eq(last, handover, 1e-12, "last sample time");
}

#[test]
fn path_is_continuous_across_handover() {
    let system = solar_system();
    let flyby = 100.0 * SECONDS_PER_DAY;
    let start = flyby - 20.0 * SECONDS_PER_DAY;
    let initial = earth_flyby(&system, flyby, 20.0 * SECONDS_PER_DAY);

    let path = system
        .build_trajectory(initial.position, initial.velocity, start)
        .expect("trajectory");

    let at_start = path
        .state_at_time(&system, start)
        .expect("lookup")
        .expect("covered");
    assert_relative_eq_vec3(at_start.position, initial.position, 1e-8, "position at start");
    assert_relative_eq_vec3(at_start.velocity, initial.velocity, 1e-8, "velocity at start");

    let handover = path.sections[0].termination.expect("handover");
    let before = path.sections[0].conic.position_at_time(handover);
    let after = system.position_at_time(Earth, handover).expect("earth")
        + path.sections[1].conic.position_at_time(handover);

    assert_relative_eq_vec3(after, before, 1e-8, "position at the handover");
    assert_eq!(path.section_at(handover - 1.0).map(|s| s.dominant_body), Some(Sun));
    assert_eq!(path.section_at(handover + 1.0).map(|s| s.dominant_body), Some(Earth));
}

#[test]
fn section_limit_cuts_the_chain() {
    let config = EngineConfig {
        chain: ChainConfig {
            max_sections: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let system = SolarSystem::new(config).expect("system");
    let flyby = 100.0 * SECONDS_PER_DAY;
    let initial = earth_flyby(&system, flyby, 20.0 * SECONDS_PER_DAY);

    let path = system
        .build_trajectory(initial.position, initial.velocity, flyby - 20.0 * SECONDS_PER_DAY)
        .expect("trajectory");

    assert_eq!(path.sections.len(), 1);
    assert_eq!(path.end, PathEnd::SectionLimit);
    assert!(path.sections[0].termination.is_some());
    assert!(path.state_at_time(&system, flyby + 10.0 * SECONDS_PER_DAY).expect("lookup").is_none());
}

#[test]
fn degenerate_start_is_an_error() {
    let system = solar_system();
    let earth = system.state_at_time(Earth, 0.0).expect("earth");

    let result = system.build_trajectory(earth.position, earth.velocity + DVec3::X, 0.0);

    assert!(matches!(
        result,
        Err(EngineError::DegenerateState(DegenerateState::ZeroRadius))
    ));
}

#[test]
fn narrowing_runs_once() {
    let state = StateVectors {
        position: DVec3::new(1e7, 0.0, 0.0),
        velocity: DVec3::new(0.0, 7000.0, 0.0),
    };
    let conic = Conic::from_relative_state(state, 3.986e14, 0.0).expect("conic");
    let samples = conic.sample(0.0, 1000.0, 16);

    let mut section = crate::ConicSection::new(conic, Earth, None, samples);
    section.termination = Some(500.0);
    section.narrow(8);

    assert_eq!(section.samples().len(), 8);
    assert_eq!(section.samples()[7].time, 500.0);

    section.termination = Some(100.0);
    section.narrow(4);
    assert_eq!(section.samples().len(), 8);
}
