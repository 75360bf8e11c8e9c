//! Error types for the engine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BodyId;

/// The ways a state vector can fail to describe a conic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegenerateState {
    /// A position, velocity or mass was NaN or infinite.
    #[error("state contains non-finite values")]
    NonFinite,

    /// The position coincides with the dominant body's center.
    #[error("position coincides with the dominant body")]
    ZeroRadius,

    /// The relative velocity is zero or purely radial, so there is no
    /// orbital plane.
    #[error("angular momentum is zero (velocity is zero or purely radial)")]
    ZeroAngularMomentum,

    /// The dominant body has no (positive) mass.
    #[error("gravitational parameter is not positive")]
    NonPositiveMu,
}

/// The error type used throughout the crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A state vector could not be turned into a conic.
    #[error("degenerate state vector: {0}")]
    DegenerateState(#[from] DegenerateState),

    /// The body is not part of this solar system.
    #[error("body {0:?} is not part of the solar system")]
    UnknownBody(BodyId),

    /// A configuration value was out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A calendar date does not exist.
    #[error("invalid calendar date {year}-{month:02}-{day}")]
    InvalidDate {
        /// The year of the date.
        year: i32,
        /// The month of the date, 1-based.
        month: u32,
        /// The (fractional) day of the month.
        day: f64,
    },

    /// A configuration file could not be read.
    #[cfg(feature = "serde")]
    #[error("failed to read config: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// A configuration file failed to parse.
    #[cfg(feature = "serde")]
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] ron::error::SpannedError),

    /// A configuration failed to serialize.
    #[cfg(feature = "serde")]
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[source] ron::Error),
}

/// A specialized `Result` type for the engine.
pub type Result<T> = core::result::Result<T, EngineError>;
