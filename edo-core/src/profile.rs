//! # Tuning Profile Persistence
//!
//! A tuning profile is a flat record with two optional fields: the ordered
//! degree names (`notes`) and the base frequency (`baseFrequency`). An absent
//! field means "not overridden"; what that resolves to is decided here, not by
//! the storage medium.
//!
//! Two media are provided: an in-memory store and a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::tuning::{DEFAULT_BASE_FREQUENCY, DEFAULT_DEGREES};

/// The persisted overrides of a tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    /// Degree names; never stored as an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    /// Frequency of the root of octave 0, in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_frequency: Option<f64>,
}

/// A key-value medium holding a [`StoredProfile`].
///
/// Writing `None` removes the field. Implementations must store an empty
/// degree list as an absent field.
pub trait ProfileStore {
    fn load(&self) -> Result<StoredProfile, ProfileError>;
    fn store_notes(&mut self, notes: Option<&[String]>) -> Result<(), ProfileError>;
    fn store_base_frequency(&mut self, base_frequency: Option<f64>) -> Result<(), ProfileError>;
    /// Removes both fields in a single write; on failure the profile is unchanged.
    fn clear(&mut self) -> Result<(), ProfileError>;
}

/// Degree names to use for a stored profile.
///
/// Absent names mean the factory defaults on a fresh session, but an emptied
/// degree set once the user has touched the tuning.
pub fn resolve_degrees(stored: &StoredProfile, touched: bool) -> Vec<String> {
    match &stored.notes {
        Some(notes) => notes.clone(),
        None if touched => Vec::new(),
        None => DEFAULT_DEGREES.clone(),
    }
}

/// Base frequency to use for a stored profile.
pub fn resolve_base_frequency(stored: &StoredProfile) -> f64 {
    stored.base_frequency.unwrap_or(DEFAULT_BASE_FREQUENCY)
}

fn non_empty(notes: Option<&[String]>) -> Option<Vec<String>> {
    notes.filter(|notes| !notes.is_empty()).map(<[String]>::to_vec)
}

/// Profile held in process memory.
///
/// Counts every write so callers can observe that a no-op change was not
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profile: StoredProfile,
    writes: usize,
}

impl MemoryProfileStore {
    pub fn new(profile: StoredProfile) -> Self {
        Self { profile, writes: 0 }
    }

    /// Number of `store_*` calls made so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn profile(&self) -> &StoredProfile {
        &self.profile
    }

    /// Replaces the whole profile, as if another writer had changed the medium.
    /// Not counted as a write.
    pub fn replace(&mut self, profile: StoredProfile) {
        self.profile = profile;
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> Result<StoredProfile, ProfileError> {
        Ok(self.profile.clone())
    }

    fn store_notes(&mut self, notes: Option<&[String]>) -> Result<(), ProfileError> {
        self.writes += 1;
        self.profile.notes = non_empty(notes);
        Ok(())
    }

    fn store_base_frequency(&mut self, base_frequency: Option<f64>) -> Result<(), ProfileError> {
        self.writes += 1;
        self.profile.base_frequency = base_frequency;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ProfileError> {
        self.writes += 1;
        self.profile = StoredProfile::default();
        Ok(())
    }
}

/// Profile saved as a JSON file.
///
/// Every write re-reads the file, changes one field and writes the whole
/// profile back. A missing file loads as an empty profile.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, profile: &StoredProfile) -> Result<(), ProfileError> {
        let json_string = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, json_string)?;
        debug!("[PROFILE] Wrote {}", self.path.display());
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self) -> Result<StoredProfile, ProfileError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[PROFILE] No profile at {}, using defaults", self.path.display());
                return Ok(StoredProfile::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn store_notes(&mut self, notes: Option<&[String]>) -> Result<(), ProfileError> {
        let mut profile = self.load()?;
        profile.notes = non_empty(notes);
        self.save(&profile)
    }

    fn store_base_frequency(&mut self, base_frequency: Option<f64>) -> Result<(), ProfileError> {
        let mut profile = self.load()?;
        profile.base_frequency = base_frequency;
        self.save(&profile)
    }

    fn clear(&mut self) -> Result<(), ProfileError> {
        self.save(&StoredProfile::default())
    }
}
