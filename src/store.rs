//! Persistence
//!
//! The analytics core never touches storage. Records, family history and the
//! supplement stack are persisted through a [`Store`] over a pluggable
//! key/value [`StorageBackend`], with each value stored as a JSON document.
//!
//! Loads never fail: missing or malformed data is logged and treated as
//! "no data", so a corrupt file degrades to an empty history instead of an
//! error surfacing in the analytics.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::TrackerError;
use crate::types::{DailyRecord, FamilyHistory, SupplementStackEntry};

/// Records written by the first release (core metrics only)
pub const RECORDS_V1_KEY: &str = "health-tracker-records-v1";
/// Current record set
pub const RECORDS_V2_KEY: &str = "health-tracker-records-v2";
pub const FAMILY_KEY: &str = "health-tracker-family-v1";
pub const SUPPLEMENTS_KEY: &str = "health-tracker-supplements-v1";

/// Key/value storage the store persists JSON documents into
pub trait StorageBackend {
    /// Raw value for `key`, `None` when absent or unreadable
    fn read(&self, key: &str) -> Option<String>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), TrackerError>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<(), TrackerError>;
}

/// In-memory backend, useful for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), TrackerError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), TrackerError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory backend storing each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read stored data");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), TrackerError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), TrackerError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Record shape written by the first release
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyRecord {
    date: String,
    sleep_hours: Option<f64>,
    exercise_minutes: Option<f64>,
    nutrition_score: Option<f64>,
    smoking_count: Option<f64>,
}

impl From<LegacyRecord> for DailyRecord {
    fn from(legacy: LegacyRecord) -> Self {
        DailyRecord {
            sleep_hours: legacy.sleep_hours,
            exercise_minutes: legacy.exercise_minutes,
            nutrition_score: legacy.nutrition_score,
            smoking_count: legacy.smoking_count,
            ..DailyRecord::new(legacy.date)
        }
    }
}

/// Typed persistence over a storage backend
#[derive(Debug, Clone)]
pub struct Store<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn safe_load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.read(key)?;
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed stored data");
                None
            }
        }
    }

    fn safe_save<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), TrackerError> {
        let json = serde_json::to_string(value)?;
        self.backend.write(key, &json)
    }

    /// Load the record history, migrating first-release data when no
    /// current records exist. Missing or malformed data yields an empty list.
    pub fn load_records(&mut self) -> Vec<DailyRecord> {
        match self.safe_load::<Vec<DailyRecord>>(RECORDS_V2_KEY) {
            Some(records) => records,
            None => self.migrate_v1_to_v2(),
        }
    }

    /// Upgrade first-release records to the current shape and persist them.
    ///
    /// Existing non-empty current records win and are returned untouched.
    pub fn migrate_v1_to_v2(&mut self) -> Vec<DailyRecord> {
        if let Some(current) = self.safe_load::<Vec<DailyRecord>>(RECORDS_V2_KEY) {
            if !current.is_empty() {
                return current;
            }
        }

        let Some(legacy) = self.safe_load::<Vec<LegacyRecord>>(RECORDS_V1_KEY) else {
            return Vec::new();
        };

        let migrated: Vec<DailyRecord> = legacy.into_iter().map(DailyRecord::from).collect();
        if let Err(e) = self.safe_save(RECORDS_V2_KEY, &migrated) {
            warn!(error = %e, "failed to persist migrated records");
        }
        debug!(count = migrated.len(), "migrated v1 records");

        migrated
    }

    pub fn save_records(&mut self, records: &[DailyRecord]) -> Result<(), TrackerError> {
        self.safe_save(RECORDS_V2_KEY, records)
    }

    /// Drop the whole record history, including first-release data
    pub fn reset_records(&mut self) -> Result<(), TrackerError> {
        self.backend.remove(RECORDS_V2_KEY)?;
        self.backend.remove(RECORDS_V1_KEY)
    }

    pub fn load_family_history(&self) -> FamilyHistory {
        self.safe_load(FAMILY_KEY).unwrap_or_default()
    }

    /// Save the family history stamped with `now`; returns the stored value
    pub fn save_family_history(
        &mut self,
        family_history: &FamilyHistory,
        now: DateTime<Utc>,
    ) -> Result<FamilyHistory, TrackerError> {
        let stamped = FamilyHistory {
            updated_at: Some(now),
            ..family_history.clone()
        };
        self.safe_save(FAMILY_KEY, &stamped)?;
        Ok(stamped)
    }

    pub fn load_supplement_stack(&self) -> Vec<SupplementStackEntry> {
        self.safe_load(SUPPLEMENTS_KEY).unwrap_or_default()
    }

    pub fn save_supplement_stack(
        &mut self,
        stack: &[SupplementStackEntry],
    ) -> Result<(), TrackerError> {
        self.safe_save(SUPPLEMENTS_KEY, stack)
    }
}
