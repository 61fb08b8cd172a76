// edo-core/src/lib.rs

//! The core logic for the EDO keyboard.
//! This crate is responsible for the tuning engine, the persisted tuning
//! session, the keyboard layout and tone playback. It is completely headless
//! and contains no GUI code.
//!
//! Pitches are named against an arbitrary equal division of the octave: a
//! degree set such as `["C", "C#", ..., "B"]` (12-EDO) or any other list of
//! names, anchored at a base frequency for the root of octave 0.

pub mod audio;
pub mod error;
pub mod keyboard;
pub mod profile;
pub mod session;
pub mod synth;
pub mod tuning;

pub use error::{ProfileError, TuningError};
pub use keyboard::{Key, KeyboardRange};
pub use profile::{JsonProfileStore, MemoryProfileStore, ProfileStore, StoredProfile};
pub use session::{TuningEvent, TuningSession};
pub use synth::{ToneBank, ToneCommand};
pub use tuning::{EdoTuning, ParsedNote};
