//! Local persistence for the application shell.
//!
//! The shell loads its state once at startup and saves after each committed
//! mutation through an injected [`KeyValueStore`]. Values are strings (JSON
//! for structured data), so any string-keyed backend can be plugged in.
//!
//! # Keys
//!
//! | Key                   | Value                          |
//! |-----------------------|--------------------------------|
//! | `hazard-nav-data`     | JSON array of hazards          |
//! | `hazard-nav-passcode` | 4-digit admin passcode         |

mod file;

pub use file::JsonFileStore;

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use thiserror::Error;

use crate::coord::Coordinate;
use crate::hazard::{Hazard, HazardId};

/// Key holding the hazard list.
pub const HAZARDS_KEY: &str = "hazard-nav-data";

/// Key holding the admin passcode.
pub const PASSCODE_KEY: &str = "hazard-nav-passcode";

/// Passcode used until the administrator sets one.
pub const DEFAULT_PASSCODE: &str = "0142";

/// Errors from persistent storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A stored value could not be decoded.
    #[error("Invalid value for '{key}': {source}")]
    InvalidValue {
        key: String,
        source: serde_json::Error,
    },

    /// A value could not be encoded.
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed persistent storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Hazards shown on first start, before any have been saved.
pub fn default_hazards() -> Vec<Hazard> {
    vec![Hazard::new(
        HazardId::from_raw(1),
        "Construction Zone",
        Coordinate::new(13.7573, 100.5028),
    )]
}

/// Load the hazard list, falling back to [`default_hazards`] if none is saved.
pub fn load_hazards(store: &dyn KeyValueStore) -> Result<Vec<Hazard>, StorageError> {
    match store.get(HAZARDS_KEY)? {
        Some(json) => serde_json::from_str(&json).map_err(|source| StorageError::InvalidValue {
            key: HAZARDS_KEY.to_string(),
            source,
        }),
        None => {
            tracing::debug!("No saved hazards, using defaults");
            Ok(default_hazards())
        }
    }
}

/// Save the hazard list.
pub fn save_hazards(store: &dyn KeyValueStore, hazards: &[Hazard]) -> Result<(), StorageError> {
    let json = serde_json::to_string(hazards)?;
    store.set(HAZARDS_KEY, &json)?;
    tracing::debug!(count = hazards.len(), "Saved hazards");
    Ok(())
}

/// Load the admin passcode, falling back to [`DEFAULT_PASSCODE`].
pub fn load_passcode(store: &dyn KeyValueStore) -> Result<String, StorageError> {
    Ok(store
        .get(PASSCODE_KEY)?
        .unwrap_or_else(|| DEFAULT_PASSCODE.to_string()))
}

/// Save the admin passcode.
pub fn save_passcode(store: &dyn KeyValueStore, passcode: &str) -> Result<(), StorageError> {
    store.set(PASSCODE_KEY, passcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let store = MemoryStore::new();
        let hazards = load_hazards(&store).unwrap();
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].name, "Construction Zone");
        assert_eq!(load_passcode(&store).unwrap(), "0142");
    }

    #[test]
    fn test_hazards_saved_and_loaded() {
        let store = MemoryStore::new();
        let hazards = vec![
            Hazard::new(HazardId::from_raw(10), "Flood", Coordinate::new(1.0, 2.0)),
            Hazard::new(HazardId::from_raw(11), "Rockfall", Coordinate::new(3.0, 4.0)),
        ];
        save_hazards(&store, &hazards).unwrap();
        assert_eq!(load_hazards(&store).unwrap(), hazards);
    }

    #[test]
    fn test_empty_list_is_not_replaced_by_defaults() {
        let store = MemoryStore::new();
        save_hazards(&store, &[]).unwrap();
        assert!(load_hazards(&store).unwrap().is_empty());
    }

    #[test]
    fn test_timestamp_ids_load() {
        // Lists written by the browser app used millisecond timestamps as ids
        let store = MemoryStore::new();
        store
            .set(
                HAZARDS_KEY,
                r#"[{"id":1718000000000,"name":"Flood","position":{"lat":13.7,"lng":100.5}}]"#,
            )
            .unwrap();
        let hazards = load_hazards(&store).unwrap();
        assert_eq!(hazards[0].id, HazardId::from_raw(1_718_000_000_000));
    }

    #[test]
    fn test_invalid_hazard_json() {
        let store = MemoryStore::new();
        store.set(HAZARDS_KEY, "not json").unwrap();
        assert!(matches!(
            load_hazards(&store),
            Err(StorageError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_passcode_round_trip() {
        let store = MemoryStore::new();
        save_passcode(&store, "9876").unwrap();
        assert_eq!(load_passcode(&store).unwrap(), "9876");
    }
}
