//! Tunable parameters for every part of the engine.
//!
//! All structs implement [`Default`] with the values the engine was tuned
//! with. With the `serde` feature enabled, they can also be read from and
//! written to RON, and missing fields fall back to their defaults.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, Result},
    BodyId, SECONDS_PER_DAY,
};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Orbit cache settings.
    pub cache: CacheConfig,
    /// Patched-conic chaining settings.
    pub chain: ChainConfig,
    /// N-body integrator settings.
    pub integrator: IntegratorConfig,
    /// Impact back-trace settings.
    pub backtrace: BacktraceConfig,
    /// Interceptor guidance settings.
    pub guidance: GuidanceConfig,
}

/// Orbit cache configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Number of points used to draw an orbit line.
    pub resolution: usize,
    /// Cached samples per orbit-line point.
    pub multiplier: usize,
    /// Acceptable error in the mean anomaly when searching for the period.
    pub period_tolerance: f64,
    /// Iteration cap for each phase of the period search.
    pub max_search_iterations: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            resolution: 360,
            multiplier: 8,
            period_tolerance: 1e-10,
            max_search_iterations: 200,
        }
    }
}

/// Patched-conic chaining configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChainConfig {
    /// Maximum number of conic sections in a trajectory.
    pub max_sections: usize,
    /// Samples taken along each conic when scanning for a change of
    /// dominant body.
    pub conic_samples: usize,
    /// Consecutive samples a new body has to stay dominant for before the
    /// section is terminated.
    pub confirmation_samples: usize,
    /// Hyperbolic conics are sampled until their distance from the
    /// dominant body reaches this many times its sphere of influence.
    pub hyperbolic_soi_factor: f64,
    /// Longest span of time a single conic is sampled over, in seconds.
    pub max_horizon: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_sections: 2,
            conic_samples: 2048,
            confirmation_samples: 3,
            hyperbolic_soi_factor: 3.0,
            max_horizon: 20.0 * 365.25 * SECONDS_PER_DAY,
        }
    }
}

/// How the integrator advances a probe by one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepScheme {
    /// Update the velocity first, then the position using the new
    /// velocity: `v += a dt; r += v dt + a dt² / 2`.
    #[default]
    KickDrift,

    /// Velocity Verlet. Costs two force evaluations per step, but is
    /// time-reversible, so integrating backwards and then forwards
    /// returns to the starting state.
    VelocityVerlet,
}

/// N-body integrator configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntegratorConfig {
    /// Smallest step, in seconds.
    pub base_step: f64,
    /// Largest step, in seconds.
    pub max_step: f64,
    /// Largest angle, in radians, the velocity may turn within one step.
    pub max_turn: f64,
    /// How many points a run's output is downsampled to.
    pub output_points: usize,
    /// Skip bodies that are closer to the Sun than the probe by more than
    /// their sphere of influence.
    pub soi_culling: bool,
    /// Bodies whose gravity is ignored. They are still tracked for
    /// closest approach and collisions.
    pub excluded_bodies: Vec<BodyId>,
    /// Radius of the probe itself, in meters, for collision checks.
    pub probe_radius: f64,
    /// Stop a run as soon as the probe hits a body.
    pub stop_on_collision: bool,
    /// Hard cap on the number of steps of a single run.
    pub max_steps: usize,
    /// Update scheme.
    pub scheme: StepScheme,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            base_step: 60.0,
            max_step: SECONDS_PER_DAY,
            max_turn: 5e-5,
            output_points: 1000,
            soi_culling: true,
            excluded_bodies: Vec::new(),
            probe_radius: 0.0,
            stop_on_collision: true,
            max_steps: 10_000_000,
            scheme: StepScheme::KickDrift,
        }
    }
}

impl IntegratorConfig {
    /// A configuration that always steps by exactly `step` seconds.
    pub fn fixed_step(step: f64) -> Self {
        Self {
            base_step: step,
            max_step: step,
            ..Default::default()
        }
    }
}

/// Impact back-trace configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BacktraceConfig {
    /// How far back from the impact to trace, in seconds.
    pub duration: f64,
    /// Fixed step used both backwards and forwards, in seconds.
    pub step: f64,
    /// Radius of the asteroid, in meters.
    pub asteroid_radius: f64,
}

impl Default for BacktraceConfig {
    fn default() -> Self {
        Self {
            duration: 100.0 * SECONDS_PER_DAY,
            step: 3.0 * 3600.0,
            asteroid_radius: 500.0,
        }
    }
}

/// Interceptor guidance configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GuidanceConfig {
    /// Largest thrust acceleration, in m/s².
    pub max_accel: f64,
    /// Shortest time-of-flight estimate, in seconds.
    pub tof_min: f64,
    /// Longest time-of-flight estimate, in seconds.
    pub tof_max: f64,
    /// Closing speed used to estimate the time of flight, in m/s.
    pub nominal_closure: f64,
    /// Fixed physics step, in seconds.
    pub step: f64,
    /// How far back from the impact the scenario starts, in seconds.
    pub lead_time: f64,
    /// Radius of the interceptor, in meters.
    pub interceptor_radius: f64,
    /// Height above the launch body's surface the interceptor starts at,
    /// behind the body along its track, in meters.
    pub launch_offset: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            max_accel: 0.05,
            tof_min: 600.0,
            tof_max: 3.0 * SECONDS_PER_DAY,
            nominal_closure: 2000.0,
            step: 600.0,
            lead_time: 180.0 * SECONDS_PER_DAY,
            interceptor_radius: 50.0,
            launch_offset: 1e5,
        }
    }
}

fn invalid(message: &str) -> EngineError {
    EngineError::InvalidConfig(message.to_string())
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl EngineConfig {
    /// Checks that every value is within its valid range.
    pub fn validate(&self) -> Result<()> {
        let cache = &self.cache;
        if cache.resolution == 0 || cache.multiplier == 0 {
            return Err(invalid("cache resolution and multiplier must be non-zero"));
        }
        if !positive(cache.period_tolerance) {
            return Err(invalid("period tolerance must be positive"));
        }

        let chain = &self.chain;
        if chain.max_sections == 0 {
            return Err(invalid("a trajectory needs at least one section"));
        }
        if chain.conic_samples < 2 {
            return Err(invalid("conics need at least two samples"));
        }
        if chain.confirmation_samples == 0 {
            return Err(invalid("confirmation samples must be non-zero"));
        }
        if !positive(chain.hyperbolic_soi_factor) || !positive(chain.max_horizon) {
            return Err(invalid("conic sampling horizon must be positive"));
        }

        let integrator = &self.integrator;
        if !positive(integrator.base_step) || integrator.max_step < integrator.base_step {
            return Err(invalid("integrator steps must satisfy 0 < base_step <= max_step"));
        }
        if !positive(integrator.max_turn) {
            return Err(invalid("max turn must be positive"));
        }
        if integrator.output_points < 2 {
            return Err(invalid("a run needs at least two output points"));
        }

        if !positive(self.backtrace.duration) || !positive(self.backtrace.step) {
            return Err(invalid("back-trace duration and step must be positive"));
        }

        let guidance = &self.guidance;
        if !positive(guidance.max_accel)
            || !positive(guidance.tof_min)
            || guidance.tof_max < guidance.tof_min
            || !positive(guidance.nominal_closure)
            || !positive(guidance.step)
        {
            return Err(invalid("guidance parameters must be positive, with tof_min <= tof_max"));
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
impl EngineConfig {
    /// Parses a configuration from RON text and validates it.
    pub fn from_ron_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = ron::from_str(contents).map_err(EngineError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a RON file and validates it.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(EngineError::ConfigRead)?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Serializes the configuration into pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        ron::ser::to_string_pretty(self, pretty).map_err(EngineError::ConfigSerialize)
    }
}
