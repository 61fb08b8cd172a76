//! # Error Types
//!
//! Errors raised by the tuning engine and by profile persistence. Engine errors
//! describe bad input from the caller and are never recovered from internally.

use thiserror::Error;

/// Result type for tuning engine operations.
pub type Result<T, E = TuningError> = std::result::Result<T, E>;

/// Errors raised while converting between note names, cents and frequencies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    /// The note string is not a degree name immediately followed by an octave number.
    #[error("could not parse note '{note}'")]
    MalformedNote {
        /// The rejected note string.
        note: String,
    },

    /// The degree name of a well-formed note is not part of the current degree set.
    #[error("could not find note name '{name}' in note '{note}'")]
    UnknownNoteName {
        /// The full note string.
        note: String,
        /// The degree name that was looked up.
        name: String,
    },

    /// A cents position resolved to a degree index outside the degree set.
    #[error("could not find name for degree {degree}")]
    UnknownDegree {
        /// The fractional degree computed before rounding.
        degree: f64,
    },
}

/// Errors raised while reading or writing a persisted tuning profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// I/O error.
    #[error("profile I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile file is not valid JSON for a tuning profile.
    #[error("profile format error: {0}")]
    Json(#[from] serde_json::Error),
}
