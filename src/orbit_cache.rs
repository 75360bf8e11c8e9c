//! Precomputed positions along a body's orbit.
//!
//! Evaluating the ephemeris means solving Kepler's equation, which is too
//! slow to do for every body on every integrator step. Instead, each
//! orbiting body samples its orbit once, over one full period, and every
//! later query interpolates between the two nearest samples.

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::CacheConfig,
    ephemeris::{position_at, OrbitalElements},
    error::{EngineError, Result},
    time::seconds_to_centuries,
    ASTRONOMICAL_UNIT, SECONDS_PER_DAY,
};

/// A fixed-resolution sampling of a body's orbit over one period.
///
/// Times are in seconds since J2000 and positions in meters.
/// Queries wrap around modulo the period, so the cache describes the orbit
/// as if its elements stopped drifting. Over the span of a trajectory that
/// is a negligible error, and it keeps every query O(1).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitCache {
    samples: Vec<DVec3>,
    period: f64,
    inverse_period: f64,
    multiplier: usize,
}

impl OrbitCache {
    /// Samples the orbit described by `elements`.
    ///
    /// The period is discovered numerically, see [`find_period`].
    /// `config.resolution * config.multiplier` samples are then taken,
    /// uniformly over `[0, period)`.
    ///
    /// # Errors
    /// Fails when the period search fails, or when the config asks for
    /// zero samples.
    pub fn build(elements: &OrbitalElements, config: &CacheConfig) -> Result<Self> {
        let count = config.resolution * config.multiplier;
        if count == 0 {
            return Err(EngineError::InvalidConfig(
                "orbit cache needs at least one sample".to_string(),
            ));
        }

        let period = find_period(elements, config)?;
        let spacing = period / count as f64;

        let samples = (0..count)
            .map(|i| {
                let (position, _) = position_at(elements, seconds_to_centuries(i as f64 * spacing));
                position * ASTRONOMICAL_UNIT
            })
            .collect();

        log::debug!(
            "built orbit cache with {count} samples over a period of {:.3} days",
            period / SECONDS_PER_DAY
        );

        Ok(Self {
            samples,
            period,
            inverse_period: 1.0 / period,
            multiplier: config.multiplier,
        })
    }

    /// Gets the interpolated position at `time` seconds since J2000.
    ///
    /// # Performance
    /// This function is O(1): one modulo and one linear interpolation.
    pub fn query(&self, time: f64) -> DVec3 {
        let count = self.samples.len();
        let phase = (time * self.inverse_period).rem_euclid(1.0) * count as f64;

        let index = (phase.floor() as usize).min(count - 1);
        let fraction = phase - index as f64;
        let next = (index + 1) % count;

        self.samples[index].lerp(self.samples[next], fraction)
    }

    /// The orbital period, in seconds.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// The time between two consecutive samples, in seconds.
    pub fn sample_spacing(&self) -> f64 {
        self.period / self.samples.len() as f64
    }

    /// All cached samples, starting at phase zero.
    pub fn samples(&self) -> &[DVec3] {
        &self.samples
    }

    /// The points used to draw the orbit: every `multiplier`-th sample,
    /// with the first point repeated at the end to close the loop.
    pub fn orbit_line(&self) -> Vec<DVec3> {
        let mut line: Vec<DVec3> = self
            .samples
            .iter()
            .step_by(self.multiplier.max(1))
            .copied()
            .collect();

        if let Some(&first) = line.first() {
            line.push(first);
        }

        line
    }
}

/// Finds the smallest time span over which the mean anomaly advances by
/// exactly one revolution.
///
/// The span is first bracketed by doubling a guess of one day, then
/// narrowed down by bisection until the mean anomaly error is below
/// `config.period_tolerance`. Both phases are capped at
/// `config.max_search_iterations`.
///
/// # Errors
/// Returns [`EngineError::InvalidConfig`] if the mean anomaly doesn't
/// advance fast enough for the doubling phase to bracket a revolution.
pub fn find_period(elements: &OrbitalElements, config: &CacheConfig) -> Result<f64> {
    use core::f64::consts::TAU;

    let start = elements.mean_anomaly_at(0.0);
    let advance = |seconds: f64| (elements.mean_anomaly_at(seconds_to_centuries(seconds)) - start).abs();

    let mut low = 0.0;
    let mut high = SECONDS_PER_DAY;
    let mut iterations = 0;

    while advance(high) < TAU {
        if iterations >= config.max_search_iterations || !high.is_finite() {
            return Err(EngineError::InvalidConfig(
                "mean anomaly does not complete a revolution".to_string(),
            ));
        }
        low = high;
        high *= 2.0;
        iterations += 1;
    }

    for _ in 0..config.max_search_iterations {
        let middle = 0.5 * (low + high);
        let error = advance(middle) - TAU;

        if error.abs() < config.period_tolerance {
            return Ok(middle);
        }

        if error < 0.0 {
            low = middle;
        } else {
            high = middle;
        }
    }

    log::warn!("period search hit its iteration cap, using the best estimate");
    Ok(0.5 * (low + high))
}
