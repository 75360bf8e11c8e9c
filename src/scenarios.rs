//! Impact and interception scenarios, expressed as configurations of the
//! N-body integrator.
//!
//! An impact scenario is set up backwards: given where and when an
//! asteroid hits a body, and how fast it is moving relative to it, the
//! asteroid is integrated back in time to find where it was beforehand.
//! Integrating forwards from there replays the impact.
//!
//! The interception scenario then launches an interceptor from the
//! impacted body, steering it with a constant-acceleration rendezvous law.

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::{BacktraceConfig, GuidanceConfig, IntegratorConfig, StepScheme},
    error::Result,
    integrator::{IntegrationRun, IntegrationSample, NBodyIntegrator, Probe},
    BodyId, SolarSystem, StateVectors,
};

/// An asteroid hitting a body.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpactEvent {
    /// The body that gets hit.
    pub body: BodyId,
    /// When the impact happens, in seconds since J2000.
    pub time: f64,
    /// The asteroid's velocity relative to the body at impact, in m/s.
    pub relative_velocity: DVec3,
}

/// The state of an impact scenario before the impact.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Backtrace {
    /// When the traced-back states apply, in seconds since J2000.
    pub start_time: f64,
    /// The asteroid at `start_time`.
    pub asteroid: Probe,
    /// The impacted body at `start_time`.
    pub body_state: StateVectors,
    /// Seconds from `start_time` until the impact.
    pub time_to_impact: f64,
    /// The asteroid's path, from the impact backwards.
    pub path: Vec<IntegrationSample>,
}

/// The integrator setup shared by the impact scenarios.
///
/// The impacted body's own gravity is ignored: at impact the asteroid is
/// at its center, where the point-mass field is singular. Steps are fixed
/// and use velocity Verlet, so tracing back and replaying forwards land on
/// the same states.
pub fn scenario_integrator_config(body: BodyId, step: f64, probe_radius: f64) -> IntegratorConfig {
    IntegratorConfig {
        scheme: StepScheme::VelocityVerlet,
        excluded_bodies: vec![body],
        probe_radius,
        ..IntegratorConfig::fixed_step(step)
    }
}

/// Traces an asteroid back from an impact, using the system's
/// [`BacktraceConfig`].
pub fn impact_backtrace(system: &SolarSystem, event: &ImpactEvent) -> Result<Backtrace> {
    trace_back(system, event, &system.config().backtrace)
}

/// Traces an asteroid back from an impact with an explicit configuration.
pub fn trace_back(
    system: &SolarSystem,
    event: &ImpactEvent,
    config: &BacktraceConfig,
) -> Result<Backtrace> {
    let body_at_impact = system.state_at_time(event.body, event.time)?;
    let asteroid = Probe::new(
        body_at_impact.position,
        body_at_impact.velocity + event.relative_velocity,
    );

    let mut integrator_config =
        scenario_integrator_config(event.body, config.step, config.asteroid_radius);
    integrator_config.stop_on_collision = false;

    let run = NBodyIntegrator::new(system, integrator_config).integrate(
        asteroid,
        event.time,
        -config.duration,
    );

    log::debug!(
        "traced asteroid back {} steps, to t = {}",
        run.steps,
        run.end_time
    );

    Ok(Backtrace {
        start_time: run.end_time,
        asteroid: run.final_state,
        body_state: system.state_at_time(event.body, run.end_time)?,
        time_to_impact: event.time - run.end_time,
        path: run.samples,
    })
}

/// Integrates a traced-back asteroid forwards until it hits something or
/// reaches the impact time.
pub fn replay_impact(
    system: &SolarSystem,
    event: &ImpactEvent,
    backtrace: &Backtrace,
    config: &BacktraceConfig,
) -> IntegrationRun {
    let integrator_config =
        scenario_integrator_config(event.body, config.step, config.asteroid_radius);

    NBodyIntegrator::new(system, integrator_config).integrate(
        backtrace.asteroid,
        backtrace.start_time,
        backtrace.time_to_impact,
    )
}

/// Whether two spheres touch.
#[inline]
pub fn spheres_touch(a: DVec3, a_radius: f64, b: DVec3, b_radius: f64) -> bool {
    a.distance(b) <= a_radius + b_radius
}

/// The thrust acceleration steering `interceptor` towards `target`.
///
/// The time of flight is estimated as the distance over a nominal closing
/// speed, clamped into `[tof_min, tof_max]`. The target is assumed to
/// keep its velocity over that time, and the acceleration is the constant
/// one that puts the interceptor on the predicted position:
/// `a = 2 (predicted - (r + v tof)) / tof²`, limited to `max_accel`.
pub fn rendezvous_acceleration(interceptor: &Probe, target: &Probe, config: &GuidanceConfig) -> DVec3 {
    let distance = interceptor.position.distance(target.position);
    let tof = (distance / config.nominal_closure).clamp(config.tof_min, config.tof_max);

    let predicted = target.position + target.velocity * tof;
    let coasting = interceptor.position + interceptor.velocity * tof;
    let command = (predicted - coasting) * (2.0 / (tof * tof));

    command.clamp_length_max(config.max_accel)
}

/// How an interception ended.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterceptionOutcome {
    /// The interceptor reached the asteroid.
    Intercepted {
        /// When, in seconds since J2000.
        time: f64,
        /// Where, in meters.
        position: DVec3,
    },

    /// The asteroid hit a body first.
    TargetImpact {
        /// The body hit.
        body: BodyId,
        /// When, in seconds since J2000.
        time: f64,
    },

    /// Neither happened within the allotted time.
    TimedOut,
}

/// The summary of an interception run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterceptionReport {
    /// How the run ended.
    pub outcome: InterceptionOutcome,
    /// Total thrust spent, in m/s.
    pub delta_v: f64,
    /// Downsampled asteroid path.
    pub target_track: Vec<IntegrationSample>,
    /// Downsampled interceptor path.
    pub interceptor_track: Vec<IntegrationSample>,
    /// How many steps were taken.
    pub steps: usize,
}

/// An interceptor chasing an asteroid that is on its way to impact.
///
/// Both are stepped in lockstep through the same integrator setup; only
/// the interceptor gets thrust.
#[derive(Clone, Debug)]
pub struct Interception<'a> {
    target_integrator: NBodyIntegrator<'a>,
    interceptor_integrator: NBodyIntegrator<'a>,
    guidance: GuidanceConfig,
    target_radius: f64,
    target: Probe,
    interceptor: Probe,
    time: f64,
    delta_v: f64,
    outcome: Option<InterceptionOutcome>,
}

impl<'a> Interception<'a> {
    /// Sets up an interception of the asteroid of `event`.
    ///
    /// The asteroid is traced back by the guidance lead time. The
    /// interceptor starts at that time, trailing the impacted body along
    /// its track by `launch_offset` meters above its surface, at the
    /// body's velocity.
    pub fn new(system: &'a SolarSystem, event: &ImpactEvent) -> Result<Self> {
        let config = system.config();
        let guidance = config.guidance.clone();
        let asteroid_radius = config.backtrace.asteroid_radius;

        let backtrace = trace_back(
            system,
            event,
            &BacktraceConfig {
                duration: guidance.lead_time,
                step: guidance.step,
                asteroid_radius,
            },
        )?;

        let body = system.body(event.body)?;
        let launch = backtrace.body_state;
        let behind = -launch.velocity.normalize_or_zero() * (body.radius + guidance.launch_offset);
        let interceptor = Probe::new(launch.position + behind, launch.velocity);

        let target_config = scenario_integrator_config(event.body, guidance.step, asteroid_radius);
        let mut interceptor_config =
            scenario_integrator_config(event.body, guidance.step, guidance.interceptor_radius);
        interceptor_config.stop_on_collision = false;

        Ok(Self {
            target_integrator: NBodyIntegrator::new(system, target_config),
            interceptor_integrator: NBodyIntegrator::new(system, interceptor_config),
            guidance,
            target_radius: asteroid_radius,
            target: backtrace.asteroid,
            interceptor,
            time: backtrace.start_time,
            delta_v: 0.0,
            outcome: None,
        })
    }

    /// The current time, in seconds since J2000.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The asteroid.
    pub fn target(&self) -> &Probe {
        &self.target
    }

    /// The interceptor.
    pub fn interceptor(&self) -> &Probe {
        &self.interceptor
    }

    /// Thrust spent so far, in m/s.
    pub fn delta_v(&self) -> f64 {
        self.delta_v
    }

    /// How the interception ended, if it has.
    pub fn outcome(&self) -> Option<InterceptionOutcome> {
        self.outcome
    }

    /// Advances both bodies by one physics step.
    ///
    /// Once an outcome is reached, both stop and this keeps returning it.
    pub fn step(&mut self) -> Option<InterceptionOutcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }

        let dt = self.guidance.step;
        let thrust = rendezvous_acceleration(&self.interceptor, &self.target, &self.guidance);
        self.delta_v += thrust.length() * dt;

        let target_hit = self
            .target_integrator
            .advance(&mut self.target, self.time, dt, DVec3::ZERO);
        self.interceptor_integrator
            .advance(&mut self.interceptor, self.time, dt, thrust);
        self.time += dt;

        if spheres_touch(
            self.target.position,
            self.target_radius,
            self.interceptor.position,
            self.guidance.interceptor_radius,
        ) {
            log::info!("interceptor reached the asteroid at t = {}, delta-v {:.3} m/s", self.time, self.delta_v);
            self.outcome = Some(InterceptionOutcome::Intercepted {
                time: self.time,
                position: self.target.position,
            });
        } else if let Some(hit) = target_hit {
            log::info!("asteroid hit {} at t = {}, delta-v {:.3} m/s", hit.body, hit.time, self.delta_v);
            self.outcome = Some(InterceptionOutcome::TargetImpact {
                body: hit.body,
                time: hit.time,
            });
        }

        if self.outcome.is_some() {
            self.target.velocity = DVec3::ZERO;
            self.interceptor.velocity = DVec3::ZERO;
        }

        self.outcome
    }

    /// Steps until an outcome is reached or `max_duration` seconds pass,
    /// keeping about `output_points` points of each path.
    pub fn run(mut self, max_duration: f64, output_points: usize) -> InterceptionReport {
        let max_steps = (max_duration / self.guidance.step).ceil().max(0.0) as usize;
        let stride = (max_steps / output_points.max(1)).max(1);

        let sample = |probe: &Probe, time: f64| IntegrationSample {
            time,
            position: probe.position,
            velocity: probe.velocity,
        };

        let mut target_track = vec![sample(&self.target, self.time)];
        let mut interceptor_track = vec![sample(&self.interceptor, self.time)];
        let mut steps = 0;

        while steps < max_steps {
            let outcome = self.step();
            steps += 1;

            if outcome.is_some() || steps % stride == 0 {
                target_track.push(sample(&self.target, self.time));
                interceptor_track.push(sample(&self.interceptor, self.time));
            }
            if outcome.is_some() {
                break;
            }
        }

        InterceptionReport {
            outcome: self.outcome.unwrap_or(InterceptionOutcome::TimedOut),
            delta_v: self.delta_v,
            target_track,
            interceptor_track,
            steps,
        }
    }
}
