//! # Keyboard Layout Module
//!
//! Lays out the playable keys of an EDO keyboard for a window of octaves.
//! Every key knows its label, cents position and frequency, so a front end only
//! has to draw and forward presses.

use crate::error::Result;
use crate::tuning::{CENTS_IN_OCTAVE, EdoTuning};

/// Highest octave number a keyboard window may reach.
pub const HIGHEST_OCTAVE_NUMBER: u32 = 9;

/// A single playable key.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Note name shown on the key (e.g. "C#4")
    pub label: String,
    /// Cents position relative to the base frequency
    pub cents: f64,
    /// Frequency in Hz
    pub frequency: f64,
    /// Position of the key's degree inside the degree set
    pub degree_index: usize,
    pub octave: u32,
    /// Drawn as a dark (raised) key
    pub accidental: bool,
}

/// The window of octaves shown on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardRange {
    start_octave: u32,
    octaves: u32,
}

impl Default for KeyboardRange {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

impl KeyboardRange {
    /// Creates a window, clamping both values to `1..HIGHEST_OCTAVE_NUMBER`
    /// and shrinking the window so it ends at or below the highest octave.
    pub fn new(start_octave: u32, octaves: u32) -> Self {
        let start_octave = start_octave.clamp(1, HIGHEST_OCTAVE_NUMBER - 1);
        let octaves = octaves
            .clamp(1, HIGHEST_OCTAVE_NUMBER - 1)
            .min(HIGHEST_OCTAVE_NUMBER - start_octave);
        Self {
            start_octave,
            octaves,
        }
    }

    pub fn start_octave(&self) -> u32 {
        self.start_octave
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn with_start_octave(self, start_octave: u32) -> Self {
        Self::new(start_octave, self.octaves)
    }

    pub fn with_octaves(self, octaves: u32) -> Self {
        Self::new(self.start_octave, octaves)
    }

    /// Lists every key in the window, lowest first.
    ///
    /// Each octave contributes one key per degree, and the root of the octave
    /// after the window closes the keyboard. An empty degree set has no keys.
    ///
    /// # Arguments
    /// * `tuning` - Tuning used to name and pitch the keys
    ///
    /// # Returns
    /// * `Ok(keys)` - `octaves * N + 1` keys, or none for an empty degree set
    pub fn keys(&self, tuning: &EdoTuning) -> Result<Vec<Key>> {
        let count = tuning.degree_count();
        if count == 0 {
            return Ok(Vec::new());
        }

        let end_octave = self.start_octave + self.octaves;
        let positions = (self.start_octave..end_octave)
            .flat_map(|octave| (0..count).map(move |degree| (octave, degree)))
            .chain(std::iter::once((end_octave, 0)));

        positions
            .map(|(octave, degree_index)| {
                let cents =
                    octave as f64 * CENTS_IN_OCTAVE + degree_index as f64 * tuning.degree_size_in_cents();
                Ok(Key {
                    label: tuning.cents_to_note_name(cents)?,
                    cents,
                    frequency: tuning.cents_to_frequency(cents),
                    degree_index,
                    octave,
                    accidental: is_accidental(&tuning.degrees()[degree_index]),
                })
            })
            .collect()
    }
}

/// Whether a degree name carries a sharp or flat sign after its letter.
pub fn is_accidental(name: &str) -> bool {
    name.chars()
        .skip(1)
        .any(|c| matches!(c, '#' | 'b' | '♯' | '♭'))
}

/// Heading text for a tuning, e.g. `("My 12-TET system", Some("(100 cents / degree)"))`.
///
/// The degree size is rounded to a tenth of a cent and omitted for an empty set.
pub fn describe_system(tuning: &EdoTuning) -> (String, Option<String>) {
    let title = format!("My {}-TET system", tuning.degree_count());
    let size = (tuning.degree_count() > 0).then(|| {
        let rounded = (tuning.degree_size_in_cents() * 10.0).round() / 10.0;
        format!("({} cents / degree)", rounded)
    });
    (title, size)
}
