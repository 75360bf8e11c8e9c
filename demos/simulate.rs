use chrono::{TimeZone, Utc};
use glam::DVec3;
use patched_conic_sim::{
    scenarios::{impact_backtrace, replay_impact, ImpactEvent, Interception},
    time::{datetime_to_seconds, julian_date_to_datetime, seconds_to_julian_date},
    BodyId, EngineConfig, EngineError, PathEnd, Probe, SolarSystem, ASTRONOMICAL_UNIT,
    SECONDS_PER_DAY,
};
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let system = SolarSystem::new(EngineConfig::default())?;
    let mut lock = io::stdout().lock();

    write!(&mut lock, "{system}")?;

    let date = Utc
        .with_ymd_and_hms(2029, 4, 13, 0, 0, 0)
        .single()
        .ok_or("ambiguous date")?;
    let time = datetime_to_seconds(&date);

    writeln!(&mut lock, "\n=== Positions on {date} (t = {time:.0} s) ===")?;
    print_all_body_positions(&mut lock, &system, time)?;

    writeln!(&mut lock, "\n=== Earth flyby ===")?;
    describe_flyby(&mut lock, &system, time)?;

    writeln!(&mut lock, "\n=== Impact scenario ===")?;
    describe_impact(&mut lock, &system, time)?;

    Ok(())
}

fn print_all_body_positions(
    out: &mut impl Write,
    system: &SolarSystem,
    time: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    for body in system.bodies() {
        let position = body.position_at_time(time) / ASTRONOMICAL_UNIT;
        writeln!(
            out,
            "{:<8} {:>9.5} {:>9.5} {:>9.5} AU",
            body.name, position.x, position.y, position.z
        )?;
    }

    Ok(())
}

fn describe_flyby(
    out: &mut impl Write,
    system: &SolarSystem,
    time: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let flyby = time + 20.0 * SECONDS_PER_DAY;
    let earth = system.state_at_time(BodyId::Earth, flyby)?;
    let sun_mu = system.body(BodyId::Sun)?.mu();

    let start = patched_conic_sim::StateVectors {
        position: earth.position + DVec3::new(0.0, 0.0, 5e7),
        velocity: earth.velocity + earth.position.normalize() * 2000.0,
    }
    .to_conic(sun_mu, flyby)?
    .state_at_time(time);

    let path = system.build_trajectory(start.position, start.velocity, time)?;

    for section in &path.sections {
        let describe = |bound: Option<f64>| match bound {
            Some(bound) => format!("{:+.2} d", (bound - time) / SECONDS_PER_DAY),
            None => "open".to_string(),
        };

        writeln!(
            out,
            "around {:<8} e = {:.5}, periapsis {:.4e} m, from {} to {}",
            section.dominant_body.name(),
            section.conic.eccentricity(),
            section.conic.periapsis(),
            describe(section.origination),
            describe(section.termination),
        )?;
    }

    match path.end {
        PathEnd::OpenEnded => writeln!(out, "path stays with its last body")?,
        PathEnd::SectionLimit => writeln!(out, "path reached its section limit")?,
        PathEnd::Degenerate(reason) => writeln!(out, "path ended early: {reason}")?,
    }

    let run = system.run_integration(Probe::from(start), time, 40.0 * SECONDS_PER_DAY);
    if let Some(approach) = run.closest_approach(BodyId::Earth) {
        writeln!(
            out,
            "integrated closest approach to Earth: {:.0} km, {:+.2} d, {} steps",
            approach.distance / 1000.0,
            (approach.time - time) / SECONDS_PER_DAY,
            run.steps
        )?;
    }

    Ok(())
}

fn describe_impact(
    out: &mut impl Write,
    system: &SolarSystem,
    time: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = ImpactEvent {
        body: BodyId::Earth,
        time,
        relative_velocity: DVec3::new(-9000.0, 4000.0, 2500.0),
    };

    let backtrace = impact_backtrace(system, &event)?;
    let start_date = julian_date_to_datetime(seconds_to_julian_date(backtrace.start_time))
        .ok_or(EngineError::InvalidConfig("start date out of range".to_string()))?;

    writeln!(
        out,
        "asteroid traced back to {start_date}, {:.4} AU from Earth",
        backtrace
            .asteroid
            .position
            .distance(backtrace.body_state.position)
            / ASTRONOMICAL_UNIT
    )?;

    let replay = replay_impact(system, &event, &backtrace, &system.config().backtrace);
    match replay.collision {
        Some(hit) => writeln!(
            out,
            "replay hits {} {:+.0} s from the predicted impact",
            hit.body,
            hit.time - event.time
        )?,
        None => writeln!(out, "replay misses")?,
    }

    let guidance = &system.config().guidance;
    let report = Interception::new(system, &event)?.run(guidance.lead_time + 10.0 * SECONDS_PER_DAY, 200);
    writeln!(
        out,
        "interception: {:?} after {} steps, delta-v {:.1} m/s",
        report.outcome, report.steps, report.delta_v
    )?;

    Ok(())
}
