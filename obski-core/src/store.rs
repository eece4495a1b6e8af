//! Durable key-value storage for the score ledger.
//!
//! The ledger only needs a tiny string map with whole-value overwrites, so the
//! store is a get/set/remove trait. [`JsonFileStore`] keeps the map in a single
//! JSON file on disk; [`MemoryStore`] backs tests and ephemeral runs.

use crate::error::StoreError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A string-valued key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// File-backed store holding every key in one JSON object.
///
/// Each write re-serializes the whole map to a `.tmp` sibling and renames it
/// over the target, so a crash mid-write leaves the previous file intact.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`. The file is not touched
    /// until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|e| self.read_error(e))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries).map_err(|e| self.write_error(e))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(|e| self.write_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn read_error(&self, e: impl std::fmt::Display) -> StoreError {
        StoreError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn write_error(&self, e: impl std::fmt::Display) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
