use core::fmt;

use glam::DVec3;

use crate::{
    body_presets,
    config::EngineConfig,
    error::{EngineError, Result},
    integrator::{IntegrationRun, NBodyIntegrator, Probe},
    math::point_mass_acceleration,
    patched_conics::{build_path, TrajectoryPath},
    BodyId, CelestialBody, StateVectors,
};

/// Struct that represents the solar system being simulated.
///
/// Every body and its orbit cache is built once, on construction. After
/// that the system is read-only, and every query is a pure function of
/// time.
#[derive(Clone, Debug, PartialEq)]
pub struct SolarSystem {
    /// The celestial bodies, with the Sun (if any) first.
    bodies: Vec<CelestialBody>,

    /// The engine configuration.
    config: EngineConfig,
}

impl SolarSystem {
    /// Creates the solar system from the built-in presets: the Sun and
    /// the eight planets.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or an orbit cache can't be
    /// built.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let bodies = body_presets::solar_system(&config.cache)?;

        log::info!("built solar system with {} bodies", bodies.len());
        Self::from_bodies(bodies, config)
    }

    /// Creates a solar system from an explicit list of bodies.
    ///
    /// # Errors
    /// Fails if the configuration is invalid, the list is empty, or a body
    /// appears more than once.
    pub fn from_bodies(bodies: Vec<CelestialBody>, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        if bodies.is_empty() {
            return Err(EngineError::InvalidConfig(
                "a solar system needs at least one body".to_string(),
            ));
        }
        for (index, body) in bodies.iter().enumerate() {
            if bodies[..index].iter().any(|other| other.id == body.id) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} appears more than once",
                    body.id
                )));
            }
        }

        Ok(Self { bodies, config })
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every body in the system.
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    /// Looks up a body.
    pub fn body(&self, id: BodyId) -> Result<&CelestialBody> {
        self.bodies
            .iter()
            .find(|body| body.id == id)
            .ok_or(EngineError::UnknownBody(id))
    }

    /// The position of a body at `time` seconds since J2000, in meters.
    pub fn position_at_time(&self, id: BodyId, time: f64) -> Result<DVec3> {
        Ok(self.body(id)?.position_at_time(time))
    }

    /// The velocity of a body at `time` seconds since J2000, in m/s.
    ///
    /// Central difference of the cached positions one sample spacing
    /// either side of `time`.
    pub fn velocity_at_time(&self, id: BodyId, time: f64) -> Result<DVec3> {
        let body = self.body(id)?;

        Ok(match body.cache() {
            None => DVec3::ZERO,
            Some(cache) => {
                let h = cache.sample_spacing();
                (body.position_at_time(time + h) - body.position_at_time(time - h)) / (2.0 * h)
            }
        })
    }

    /// The position and velocity of a body at `time` seconds since J2000.
    pub fn state_at_time(&self, id: BodyId, time: f64) -> Result<StateVectors> {
        Ok(StateVectors {
            position: self.position_at_time(id, time)?,
            velocity: self.velocity_at_time(id, time)?,
        })
    }

    /// The gravitational acceleration a body exerts at `position` at
    /// `time` seconds since J2000, in m/s².
    pub fn pull_at_time_and_position(&self, id: BodyId, time: f64, position: DVec3) -> Result<DVec3> {
        let body = self.body(id)?;

        Ok(point_mass_acceleration(
            body.mu(),
            body.position_at_time(time) - position,
        ))
    }

    /// The magnitude of the pull a body exerts at `position` at `time`
    /// seconds since J2000, `μ / d²` in m/s².
    pub fn pull_magnitude_at_time_and_position(
        &self,
        id: BodyId,
        time: f64,
        position: DVec3,
    ) -> Result<f64> {
        let body = self.body(id)?;

        Ok(body.mu() / body.position_at_time(time).distance_squared(position))
    }

    /// The body exerting the strongest pull at `position` at `time`
    /// seconds since J2000.
    pub fn dominant_body_at(&self, time: f64, position: DVec3) -> BodyId {
        let mut dominant = self.bodies[0].id;
        let mut strongest = f64::NEG_INFINITY;

        for body in &self.bodies {
            let pull = body.mu() / body.position_at_time(time).distance_squared(position);
            if pull > strongest {
                strongest = pull;
                dominant = body.id;
            }
        }

        dominant
    }

    /// Builds a patched-conic trajectory from a heliocentric state at
    /// `time` seconds since J2000.
    pub fn build_trajectory(
        &self,
        position: DVec3,
        velocity: DVec3,
        time: f64,
    ) -> Result<TrajectoryPath> {
        build_path(self, position, velocity, time)
    }

    /// Creates an N-body integrator with the system's integrator config.
    pub fn integrator(&self) -> NBodyIntegrator<'_> {
        NBodyIntegrator::new(self, self.config.integrator.clone())
    }

    /// Integrates a probe for `duration` seconds from `start_time`.
    pub fn run_integration(&self, initial: Probe, start_time: f64, duration: f64) -> IntegrationRun {
        self.integrator().integrate(initial, start_time, duration)
    }
}

impl fmt::Display for SolarSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solar system with {} bodies:", self.bodies.len())?;

        for body in &self.bodies {
            write!(
                f,
                "  {:<8} mass {:.4e} kg, radius {:.3e} m",
                body.name, body.mass, body.radius
            )?;
            match body.cache() {
                Some(cache) => writeln!(
                    f,
                    ", SOI {:.3e} m, period {:.2} days",
                    body.soi_radius,
                    cache.period() / crate::SECONDS_PER_DAY
                )?,
                None => writeln!(f)?,
            }
        }

        Ok(())
    }
}
