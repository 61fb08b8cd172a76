//! # Equal-Division Tuning Module
//!
//! This module converts between the three ways a pitch is described on an
//! N-EDO keyboard: a note name (degree name + octave number), a cents position
//! relative to the base frequency, and a frequency in Hz.
//!
//! ## Features
//! - Any number of degrees per octave, with arbitrary degree names
//! - Note name parsing (`"C#4"`, `"Bb10"`, `"Ж3"`)
//! - Cents to note name lookup with true (non-negative) octave modulo
//! - Note name and cents to frequency conversion
//! - Nearest-note lookup for a measured frequency
//!
//! Cents are the canonical intermediate representation: degree `d` of octave
//! `o` sits at `o * 1200 + d * (1200 / N)`, and the octave is always an exact
//! frequency doubling regardless of `N`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TuningError};

/// Number of cents in one octave.
pub const CENTS_IN_OCTAVE: f64 = 1200.0;

/// Frequency of the root of octave 0 when nothing else is configured (C0).
pub const DEFAULT_BASE_FREQUENCY: f64 = 16.35;

/// The twelve Western degree names used until the user chooses others.
pub const DEFAULT_DEGREE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Owned copy of [`DEFAULT_DEGREE_NAMES`], built once.
pub static DEFAULT_DEGREES: Lazy<Vec<String>> = Lazy::new(|| {
    DEFAULT_DEGREE_NAMES
        .iter()
        .map(|name| name.to_string())
        .collect()
});

/// A degree name (no digits, no spaces) followed by an octave number, nothing else.
static NOTE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^0-9 ]+)([0-9]+)$").expect("note pattern is a valid regex"));

/// A note string split into its parts and resolved against a degree set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    /// Degree name (e.g. "C#")
    pub name: String,
    /// Octave number
    pub octave: i32,
    /// Position of `name` inside the degree set
    pub degree_index: usize,
}

impl fmt::Display for ParsedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// A snapshot of an equal-division tuning: the ordered degree names of one
/// octave and the frequency of cents position 0.
///
/// All conversions are pure; the snapshot is never mutated by them.
///
/// Duplicate degree names are allowed, but name lookups resolve to the first
/// occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct EdoTuning {
    degrees: Vec<String>,
    base_frequency: f64,
}

impl Default for EdoTuning {
    /// Standard 12-TET naming anchored at C0 = 16.35 Hz.
    fn default() -> Self {
        Self::new(DEFAULT_DEGREES.clone(), DEFAULT_BASE_FREQUENCY)
    }
}

impl EdoTuning {
    pub fn new(degrees: Vec<String>, base_frequency: f64) -> Self {
        Self {
            degrees,
            base_frequency,
        }
    }

    /// Degree names in ascending order within one octave.
    pub fn degrees(&self) -> &[String] {
        &self.degrees
    }

    /// Frequency in Hz of cents position 0 (the root of octave 0).
    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    /// Number of degrees per octave (the N of N-EDO).
    pub fn degree_count(&self) -> usize {
        self.degrees.len()
    }

    /// Size of one degree in cents.
    ///
    /// Infinite for an empty degree set; callers that need a finite value must
    /// check [`EdoTuning::degree_count`] first.
    pub fn degree_size_in_cents(&self) -> f64 {
        CENTS_IN_OCTAVE / self.degrees.len() as f64
    }

    /// Position of the first degree called `name`.
    pub fn degree_index(&self, name: &str) -> Option<usize> {
        self.degrees.iter().position(|degree| degree == name)
    }

    /// Names the pitch at a cents position.
    ///
    /// The cents value is rounded to a whole cent first, then split into an
    /// octave and a (non-negative) position inside that octave, which is
    /// rounded to the nearest degree.
    ///
    /// # Arguments
    /// * `cents` - Pitch distance from the base frequency
    ///
    /// # Returns
    /// * `Ok(name)` - Degree name and octave concatenated, e.g. `"C#4"` or `"B-1"`
    /// * `Err(TuningError::UnknownDegree)` - The position rounds to a degree outside
    ///   the set, which always happens for an empty set and for positions that
    ///   round up to the next octave's root
    pub fn cents_to_note_name(&self, cents: f64) -> Result<String> {
        let rounded_cents = round_half_up(cents);
        let octave = (rounded_cents / CENTS_IN_OCTAVE).floor();
        let degree = rounded_cents.rem_euclid(CENTS_IN_OCTAVE) / self.degree_size_in_cents();

        let name = self
            .degree_name_at(degree)
            .ok_or(TuningError::UnknownDegree { degree })?;
        Ok(format!("{}{}", name, octave as i64))
    }

    /// Splits a note string into degree name and octave and resolves the name.
    ///
    /// # Arguments
    /// * `note` - Note string such as `"C#4"`; the whole string must match
    ///
    /// # Returns
    /// * `Ok(ParsedNote)` - Name, octave and degree index
    /// * `Err(TuningError::MalformedNote)` - Not a name followed by digits, or
    ///   an octave number too large for `i32`
    /// * `Err(TuningError::UnknownNoteName)` - Name is not in the degree set
    pub fn parse_note(&self, note: &str) -> Result<ParsedNote> {
        let malformed = || TuningError::MalformedNote {
            note: note.to_string(),
        };

        let captures = NOTE_PATTERN.captures(note).ok_or_else(malformed)?;
        let name = &captures[1];
        // Only an octave too large for i32 can fail here.
        let octave: i32 = captures[2].parse().map_err(|_| malformed())?;

        let degree_index = self
            .degree_index(name)
            .ok_or_else(|| TuningError::UnknownNoteName {
                note: note.to_string(),
                name: name.to_string(),
            })?;

        Ok(ParsedNote {
            name: name.to_string(),
            octave,
            degree_index,
        })
    }

    /// Cents position of a note: `octave * 1200 + degree_index * degree_size`.
    pub fn note_to_cents(&self, note: &str) -> Result<f64> {
        let parsed = self.parse_note(note)?;
        Ok(CENTS_IN_OCTAVE * parsed.octave as f64
            + parsed.degree_index as f64 * self.degree_size_in_cents())
    }

    /// Frequency in Hz of a note.
    pub fn note_to_frequency(&self, note: &str) -> Result<f64> {
        Ok(self.cents_to_frequency(self.note_to_cents(note)?))
    }

    /// Frequency in Hz of a cents position: `base * 2^(cents / 1200)`.
    ///
    /// A single exponentiation keeps the error constant across octaves.
    pub fn cents_to_frequency(&self, cents: f64) -> f64 {
        self.base_frequency * 2.0_f64.powf(cents / CENTS_IN_OCTAVE)
    }

    /// Cents position of a frequency; the inverse of [`EdoTuning::cents_to_frequency`].
    pub fn frequency_to_cents(&self, frequency: f64) -> f64 {
        cents_deviation(frequency, self.base_frequency)
    }

    /// Finds the degree closest to a measured frequency.
    ///
    /// Unlike [`EdoTuning::cents_to_note_name`], a frequency just below the next
    /// octave's root resolves to that root.
    ///
    /// # Arguments
    /// * `frequency` - Measured frequency in Hz
    ///
    /// # Returns
    /// * `(note_name, target_frequency)` - Closest note and its exact frequency
    pub fn nearest_note(&self, frequency: f64) -> Result<(String, f64)> {
        let degree = self.frequency_to_cents(frequency) / self.degree_size_in_cents();
        if self.degrees.is_empty() || !degree.is_finite() {
            return Err(TuningError::UnknownDegree { degree });
        }

        let steps = round_half_up(degree) as i64;
        let count = self.degrees.len() as i64;
        let name = &self.degrees[steps.rem_euclid(count) as usize];
        let octave = steps.div_euclid(count);

        let target = self.cents_to_frequency(steps as f64 * self.degree_size_in_cents());
        Ok((format!("{}{}", name, octave), target))
    }

    fn degree_name_at(&self, degree: f64) -> Option<&str> {
        if !degree.is_finite() || degree < 0.0 {
            return None;
        }
        self.degrees
            .get(round_half_up(degree) as usize)
            .map(String::as_str)
    }
}

/// Calculates the deviation of a frequency from a target frequency in cents.
///
/// Positive values are sharp, negative values flat.
pub fn cents_deviation(frequency: f64, target_frequency: f64) -> f64 {
    CENTS_IN_OCTAVE * (frequency / target_frequency).log2()
}

/// Rounds to the nearest integer, with halves going up (towards +inf).
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
