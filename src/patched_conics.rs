//! Patched conics: approximating free flight through the solar system as
//! a chain of two-body conics.
//!
//! A trajectory starts as a conic around whichever body pulls the hardest
//! on it. That conic is sampled, and at each sample the pull of every body
//! is compared. As soon as another body takes over, and keeps the lead for
//! a few consecutive samples, the section is cut off there and the state
//! at that instant is re-expressed relative to the new dominant body,
//! starting the next section.

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    conic::{Conic, ConicSample},
    error::{DegenerateState, EngineError, Result},
    BodyId, SolarSystem, StateVectors,
};

/// One conic of a trajectory, with the span of time it is valid for.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConicSection {
    /// The conic, relative to the dominant body.
    pub conic: Conic,

    /// The body the conic is around.
    pub dominant_body: BodyId,

    /// When the section starts, in seconds since J2000.
    /// `None` for the first section of a trajectory.
    pub origination: Option<f64>,

    /// When the section ends, in seconds since J2000.
    /// `None` if it stays valid for the whole sampled horizon.
    pub termination: Option<f64>,

    samples: Vec<ConicSample>,
    narrowed: bool,
}

impl ConicSection {
    /// Creates a section that hasn't been bounded yet.
    pub fn new(
        conic: Conic,
        dominant_body: BodyId,
        origination: Option<f64>,
        samples: Vec<ConicSample>,
    ) -> Self {
        Self {
            conic,
            dominant_body,
            origination,
            termination: None,
            samples,
            narrowed: false,
        }
    }

    /// The sampled points, relative to the dominant body.
    pub fn samples(&self) -> &[ConicSample] {
        &self.samples
    }

    /// Whether [`narrow`][Self::narrow] already ran.
    pub fn is_narrowed(&self) -> bool {
        self.narrowed
    }

    /// Resamples the conic with `count` points between the section's
    /// bounds, so the whole sample budget covers the part that is valid.
    ///
    /// Unset bounds fall back to the conic's reference time and to the
    /// end of the current samples. This only ever runs once; later calls
    /// are no-ops.
    pub fn narrow(&mut self, count: usize) {
        if self.narrowed {
            return;
        }
        self.narrowed = true;

        let start = self.origination.unwrap_or(self.conic.reference_time());
        let end = match (self.termination, self.samples.last()) {
            (Some(termination), _) => termination,
            (None, Some(last)) => last.time,
            (None, None) => return,
        };

        self.samples = self.conic.sample(start, end, count);
    }

    /// Whether the section covers `time`.
    pub fn is_valid_at(&self, time: f64) -> bool {
        self.origination.map_or(true, |start| time >= start)
            && self.termination.map_or(true, |end| time <= end)
    }

    /// The samples in heliocentric coordinates, for drawing.
    pub fn world_points(&self, system: &SolarSystem) -> Result<Vec<DVec3>> {
        self.samples
            .iter()
            .map(|sample| Ok(system.position_at_time(self.dominant_body, sample.time)? + sample.position))
            .collect()
    }
}

/// Why a trajectory stopped growing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathEnd {
    /// The last section never leaves its dominant body.
    OpenEnded,

    /// The section limit was reached. The last section's conic still
    /// describes the trajectory past its termination, but other bodies
    /// are no longer accounted for.
    SectionLimit,

    /// The state at a handover had no well-defined conic around the new
    /// dominant body.
    Degenerate(DegenerateState),
}

/// A trajectory made of chained conic sections.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryPath {
    /// The sections, in chronological order.
    pub sections: Vec<ConicSection>,

    /// Why the chain ended.
    pub end: PathEnd,
}

impl TrajectoryPath {
    /// The section covering `time`, if any.
    pub fn section_at(&self, time: f64) -> Option<&ConicSection> {
        self.sections.iter().find(|section| section.is_valid_at(time))
    }

    /// The heliocentric state at `time`, or `None` if no section covers it.
    pub fn state_at_time(&self, system: &SolarSystem, time: f64) -> Result<Option<StateVectors>> {
        let Some(section) = self.section_at(time) else {
            return Ok(None);
        };

        let relative = section.conic.state_at_time(time);
        let body = system.state_at_time(section.dominant_body, time)?;

        Ok(Some(StateVectors {
            position: body.position + relative.position,
            velocity: body.velocity + relative.velocity,
        }))
    }
}

/// Finds where dominance is handed over from `anchor` to another body.
///
/// Scans from the second sample on. After a sample where `anchor` is no
/// longer dominant, the handover is confirmed once a single other body is
/// dominant for `confirmation` consecutive samples. Returns the index of
/// the first sample of that run and the new dominant body.
pub fn find_handover(
    dominants: &[BodyId],
    anchor: BodyId,
    confirmation: usize,
) -> Option<(usize, BodyId)> {
    let confirmation = confirmation.max(1);
    let mut run: Option<(usize, BodyId, usize)> = None;

    for (index, &dominant) in dominants.iter().enumerate().skip(1) {
        if dominant == anchor {
            run = None;
            continue;
        }

        let (start, count) = match run {
            Some((start, body, count)) if body == dominant => (start, count + 1),
            _ => (index, 1),
        };

        if count >= confirmation {
            return Some((start, dominant));
        }
        run = Some((start, dominant, count));
    }

    None
}

/// Builds a patched-conic trajectory from a heliocentric state at `time`
/// seconds since J2000.
///
/// # Errors
/// Fails if the starting state itself is degenerate around its dominant
/// body. A degenerate state at a later handover ends the path early
/// instead, with [`PathEnd::Degenerate`].
pub fn build_path(
    system: &SolarSystem,
    position: DVec3,
    velocity: DVec3,
    time: f64,
) -> Result<TrajectoryPath> {
    let config = &system.config().chain;

    let mut anchor = system.dominant_body_at(time, position);
    let mut state = StateVectors { position, velocity };
    let mut start = time;
    let mut origination = None;
    let mut sections = Vec::with_capacity(config.max_sections);

    loop {
        let body = system.body(anchor)?;
        let body_state = system.state_at_time(anchor, start)?;

        let conic = match Conic::from_state_vector(
            state.position,
            state.velocity,
            body.mass,
            body_state.position,
            body_state.velocity,
            start,
        ) {
            Ok(conic) => conic,
            Err(EngineError::DegenerateState(reason)) if !sections.is_empty() => {
                log::warn!("trajectory ends early, handover to {anchor} at t = {start} is degenerate: {reason}");
                return Ok(TrajectoryPath {
                    sections,
                    end: PathEnd::Degenerate(reason),
                });
            }
            Err(err) => return Err(err),
        };

        let end = conic.sample_horizon(
            start,
            body.soi_radius * config.hyperbolic_soi_factor,
            config.max_horizon,
        );
        let samples = conic.sample(start, end, config.conic_samples);

        let dominants = samples
            .iter()
            .map(|sample| {
                let position = system.position_at_time(anchor, sample.time)? + sample.position;
                Ok(system.dominant_body_at(sample.time, position))
            })
            .collect::<Result<Vec<_>>>()?;

        let handover = find_handover(&dominants, anchor, config.confirmation_samples);
        let mut section = ConicSection::new(conic, anchor, origination, samples);

        let Some((index, next)) = handover else {
            section.narrow(config.conic_samples);
            sections.push(section);
            log::debug!("trajectory stays around {anchor}, {} section(s)", sections.len());
            return Ok(TrajectoryPath {
                sections,
                end: PathEnd::OpenEnded,
            });
        };

        let termination = section.samples()[index].time;
        section.termination = Some(termination);
        section.narrow(config.conic_samples);
        sections.push(section);

        if sections.len() >= config.max_sections {
            log::debug!("trajectory reached its limit of {} sections", config.max_sections);
            return Ok(TrajectoryPath {
                sections,
                end: PathEnd::SectionLimit,
            });
        }

        log::debug!("handing over from {anchor} to {next} at t = {termination}");

        let relative = conic.state_at_time(termination);
        let anchor_state = system.state_at_time(anchor, termination)?;
        state = StateVectors {
            position: anchor_state.position + relative.position,
            velocity: anchor_state.velocity + relative.velocity,
        };

        anchor = next;
        start = termination;
        origination = Some(termination);
    }
}
