//! Numeric N-body propagation of a massless probe.
//!
//! The background bodies are not integrated; they follow their orbit
//! caches. Only the probe's state is stepped, under the summed gravity of
//! every body that isn't culled.
//!
//! # Example
//! ```
//! use glam::DVec3;
//! use patched_conic_sim::{EngineConfig, Probe, SolarSystem};
//!
//! let system = SolarSystem::new(EngineConfig::default()).unwrap();
//! let earth = system.state_at_time(patched_conic_sim::BodyId::Earth, 0.0).unwrap();
//!
//! let probe = Probe::new(
//!     earth.position + DVec3::new(1e9, 0.0, 0.0),
//!     earth.velocity,
//! );
//! let run = system.run_integration(probe, 0.0, 86400.0);
//!
//! assert!(run.steps > 0);
//! assert!(run.collision.is_none());
//! ```

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::{IntegratorConfig, StepScheme},
    math::point_mass_acceleration,
    BodyId, CelestialBody, SolarSystem, StateVectors,
};

/// The mutable state of a probe being integrated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Probe {
    /// Heliocentric position, in meters.
    pub position: DVec3,
    /// Heliocentric velocity, in meters per second.
    pub velocity: DVec3,
    /// The acceleration last evaluated at this state, in m/s².
    pub acceleration: DVec3,
}

impl Probe {
    /// Creates a probe whose acceleration hasn't been evaluated yet.
    pub fn new(position: DVec3, velocity: DVec3) -> Self {
        Self {
            position,
            velocity,
            acceleration: DVec3::ZERO,
        }
    }

    /// The position and velocity of the probe.
    pub fn state(&self) -> StateVectors {
        StateVectors {
            position: self.position,
            velocity: self.velocity,
        }
    }
}

impl From<StateVectors> for Probe {
    fn from(state: StateVectors) -> Self {
        Self::new(state.position, state.velocity)
    }
}

/// The closest a probe came to a body during a run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClosestApproach {
    /// The body approached.
    pub body: BodyId,
    /// The distance between the probe and the body's center, in meters.
    pub distance: f64,
    /// When it happened, in seconds since J2000.
    pub time: f64,
    /// Where the probe was, in meters.
    pub position: DVec3,
}

/// A probe reaching a body's surface.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Collision {
    /// The body hit.
    pub body: BodyId,
    /// When it happened, in seconds since J2000.
    pub time: f64,
    /// Where the probe was, in meters.
    pub position: DVec3,
}

/// One point of an integrated trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegrationSample {
    /// Seconds since J2000.
    pub time: f64,
    /// Heliocentric position, in meters.
    pub position: DVec3,
    /// Heliocentric velocity, in meters per second.
    pub velocity: DVec3,
}

/// The result of an integration run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegrationRun {
    /// The trajectory, downsampled to the configured point budget.
    /// Always starts with the initial state and ends with the final one.
    pub samples: Vec<IntegrationSample>,
    /// The probe's state when the run stopped.
    pub final_state: Probe,
    /// When the run stopped, in seconds since J2000.
    pub end_time: f64,
    /// The closest approach to every body.
    pub closest_approaches: Vec<ClosestApproach>,
    /// The first collision, if any.
    pub collision: Option<Collision>,
    /// How many steps were taken.
    pub steps: usize,
}

impl IntegrationRun {
    /// The closest approach to a given body.
    pub fn closest_approach(&self, body: BodyId) -> Option<&ClosestApproach> {
        self.closest_approaches.iter().find(|approach| approach.body == body)
    }
}

/// Per-body data refreshed on every step of a run.
#[derive(Clone, Debug)]
pub struct WorkingData<'a> {
    /// The body this entry is about.
    pub body: &'a CelestialBody,
    /// The body's position at the last refresh, in meters.
    pub position: DVec3,
    /// The body's distance from the Sun at the last refresh, in meters.
    pub solar_distance: f64,
    /// `GM`, in m³/s².
    pub mu: f64,
    /// The body's radius, in meters.
    pub radius: f64,
    /// The body's sphere of influence radius, in meters.
    pub soi_radius: f64,
    /// Whether the body's gravity is ignored.
    pub excluded: bool,
    /// The closest approach so far.
    pub closest_approach: ClosestApproach,
}

/// An explicit stepper for a probe under the gravity of a solar system.
#[derive(Clone, Debug)]
pub struct NBodyIntegrator<'a> {
    config: IntegratorConfig,
    working: Vec<WorkingData<'a>>,
    refreshed_at: Option<f64>,
}

impl<'a> NBodyIntegrator<'a> {
    /// Creates an integrator over every body of `system`.
    pub fn new(system: &'a SolarSystem, config: IntegratorConfig) -> Self {
        let working = system
            .bodies()
            .iter()
            .map(|body| WorkingData {
                body,
                position: DVec3::ZERO,
                solar_distance: 0.0,
                mu: body.mu(),
                radius: body.radius,
                soi_radius: body.soi_radius,
                excluded: config.excluded_bodies.contains(&body.id),
                closest_approach: ClosestApproach {
                    body: body.id,
                    distance: f64::INFINITY,
                    time: f64::NAN,
                    position: DVec3::NAN,
                },
            })
            .collect();

        Self {
            config,
            working,
            refreshed_at: None,
        }
    }

    /// The configuration the integrator was created with.
    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// The per-body data, ordered by distance from the Sun as of the last
    /// refresh.
    pub fn working_data(&self) -> &[WorkingData<'a>] {
        &self.working
    }

    /// Moves every body to where it is at `time`, then reorders them by
    /// distance from the Sun.
    pub fn refresh(&mut self, time: f64) {
        if self.refreshed_at == Some(time) {
            return;
        }

        for entry in &mut self.working {
            entry.position = entry.body.position_at_time(time);
            entry.solar_distance = entry.position.length();
        }
        self.working
            .sort_by(|a, b| a.solar_distance.total_cmp(&b.solar_distance));

        self.refreshed_at = Some(time);
    }

    /// The gravitational acceleration at `position`, using the body
    /// positions of the last refresh.
    ///
    /// Bodies are summed in increasing distance from the Sun. With
    /// culling on, a body is skipped when the probe is farther from the
    /// Sun than the body by more than its sphere of influence. Bodies
    /// farther out than the probe are always summed, and the Sun's sphere
    /// of influence is infinite, so it is never skipped.
    pub fn acceleration(&self, position: DVec3) -> DVec3 {
        let probe_distance = position.length();

        self.working
            .iter()
            .filter(|entry| !entry.excluded)
            .filter(|entry| {
                !self.config.soi_culling
                    || probe_distance - entry.solar_distance <= entry.soi_radius
            })
            .fold(DVec3::ZERO, |sum, entry| {
                sum + point_mass_acceleration(entry.mu, entry.position - position)
            })
    }

    /// The next step size for the probe, in seconds, always positive.
    ///
    /// The step is sized so the velocity turns by at most `max_turn`
    /// radians, using `|v × a| / |v|²` as the turning rate, and then
    /// clamped into `[base_step, max_step]`.
    pub fn next_step_size(&self, probe: &Probe) -> f64 {
        let turning = probe.velocity.cross(probe.acceleration).length();
        let speed_squared = probe.velocity.length_squared();

        let step = if turning > 0.0 {
            self.config.max_turn * speed_squared / turning
        } else {
            self.config.max_step
        };

        if step.is_nan() {
            self.config.base_step
        } else {
            step.clamp(self.config.base_step, self.config.max_step)
        }
    }

    /// Records the probe's distance to every body at `time`.
    pub fn track_approaches(&mut self, position: DVec3, time: f64) {
        for entry in &mut self.working {
            let distance = entry.position.distance(position);
            if distance < entry.closest_approach.distance {
                entry.closest_approach = ClosestApproach {
                    body: entry.body.id,
                    distance,
                    time,
                    position,
                };
            }
        }
    }

    /// The first body the probe is touching, as of the last refresh.
    pub fn collision(&self, position: DVec3, time: f64) -> Option<Collision> {
        self.working
            .iter()
            .find(|entry| entry.position.distance(position) <= entry.radius + self.config.probe_radius)
            .map(|entry| Collision {
                body: entry.body.id,
                time,
                position,
            })
    }

    /// Clears the closest approaches recorded so far.
    pub fn reset_approaches(&mut self) {
        for entry in &mut self.working {
            entry.closest_approach.distance = f64::INFINITY;
            entry.closest_approach.time = f64::NAN;
            entry.closest_approach.position = DVec3::NAN;
        }
    }

    /// The closest approaches recorded so far, in body order.
    pub fn closest_approaches(&self) -> Vec<ClosestApproach> {
        let mut approaches: Vec<ClosestApproach> = self
            .working
            .iter()
            .map(|entry| entry.closest_approach)
            .collect();
        approaches.sort_by_key(|approach| approach.body);
        approaches
    }

    /// Advances the probe by `dt` seconds from `time`, with an extra
    /// acceleration (such as thrust) held constant over the step.
    ///
    /// `dt` may be negative to step backwards. Returns the collision at
    /// the new position, if any.
    pub fn advance(
        &mut self,
        probe: &mut Probe,
        time: f64,
        dt: f64,
        extra_acceleration: DVec3,
    ) -> Option<Collision> {
        self.refresh(time);
        probe.acceleration = self.acceleration(probe.position) + extra_acceleration;
        self.track_approaches(probe.position, time);

        self.step(probe, time, dt, extra_acceleration);

        self.refresh(time + dt);
        self.track_approaches(probe.position, time + dt);
        self.collision(probe.position, time + dt)
    }

    /// Applies one update, assuming `probe.acceleration` was evaluated at
    /// `time` and includes `extra_acceleration`.
    fn step(&mut self, probe: &mut Probe, time: f64, dt: f64, extra_acceleration: DVec3) {
        let acceleration = probe.acceleration;

        match self.config.scheme {
            StepScheme::KickDrift => {
                probe.velocity += acceleration * dt;
                probe.position += probe.velocity * dt + 0.5 * acceleration * dt * dt;
            }
            StepScheme::VelocityVerlet => {
                let position = probe.position + probe.velocity * dt + 0.5 * acceleration * dt * dt;

                self.refresh(time + dt);
                let next_acceleration = self.acceleration(position) + extra_acceleration;

                probe.velocity += 0.5 * (acceleration + next_acceleration) * dt;
                probe.position = position;
                probe.acceleration = next_acceleration;
            }
        }
    }

    /// Integrates the probe for `duration` seconds from `start_time`.
    ///
    /// A negative duration integrates backwards. The run stops early on a
    /// collision if `stop_on_collision` is set, or when `max_steps` is hit.
    pub fn integrate(&mut self, probe: Probe, start_time: f64, duration: f64) -> IntegrationRun {
        self.reset_approaches();

        let mut probe = probe;
        let direction = if duration < 0.0 { -1.0 } else { 1.0 };
        let end_time = start_time + duration;
        let spacing = duration.abs() / self.config.output_points.max(1) as f64;

        let mut time = start_time;
        let mut last_sample = start_time;
        let mut samples = vec![IntegrationSample {
            time,
            position: probe.position,
            velocity: probe.velocity,
        }];
        let mut collision = None;
        let mut steps = 0;

        loop {
            self.refresh(time);
            probe.acceleration = self.acceleration(probe.position);
            self.track_approaches(probe.position, time);

            if collision.is_none() {
                collision = self.collision(probe.position, time);
                if let Some(hit) = collision {
                    log::debug!("probe hit {} at t = {}", hit.body, hit.time);
                    if self.config.stop_on_collision {
                        break;
                    }
                }
            }

            let remaining = (end_time - time) * direction;
            if remaining <= 0.0 {
                break;
            }
            if steps >= self.config.max_steps {
                log::warn!("integration stopped after {steps} steps, {remaining} s short of its end");
                break;
            }

            let size = self.next_step_size(&probe);
            let (dt, next_time) = if size >= remaining {
                (end_time - time, end_time)
            } else {
                (direction * size, time + direction * size)
            };

            self.step(&mut probe, time, dt, DVec3::ZERO);
            time = next_time;
            steps += 1;

            if (time - last_sample).abs() >= spacing {
                samples.push(IntegrationSample {
                    time,
                    position: probe.position,
                    velocity: probe.velocity,
                });
                last_sample = time;
            }
        }

        if last_sample != time {
            samples.push(IntegrationSample {
                time,
                position: probe.position,
                velocity: probe.velocity,
            });
        }

        IntegrationRun {
            samples,
            final_state: probe,
            end_time: time,
            closest_approaches: self.closest_approaches(),
            collision,
            steps,
        }
    }
}
