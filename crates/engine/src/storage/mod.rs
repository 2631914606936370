//! Key-value preference storage.
//!
//! Progress and audio settings are small scalars written under named keys.
//! [`MemoryStore`] keeps them in process; [`JsonFileStore`] persists the same
//! map to a JSON document with temp-file-then-rename writes.

mod atomic_io;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use atomic_io::write_json_atomic;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read preferences at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write preferences at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode preferences for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    fn has_key(&self, key: &str) -> bool;
    fn get_int(&self, key: &str) -> Option<i32>;
    fn set_int(&mut self, key: &str, value: i32);
    /// Integer entries are widened so a volume written as `1` still reads back.
    fn get_float(&self, key: &str) -> Option<f32>;
    fn set_float(&mut self, key: &str, value: f32);
    fn delete_key(&mut self, key: &str);
    fn save(&mut self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum PrefValue {
    Int(i32),
    Float(f32),
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, PrefValue>,
    save_count: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> u32 {
        self.save_count
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.values.get(key)? {
            PrefValue::Int(value) => Some(*value),
            PrefValue::Float(_) => None,
        }
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_string(), PrefValue::Int(value));
    }

    fn get_float(&self, key: &str) -> Option<f32> {
        match self.values.get(key)? {
            PrefValue::Int(value) => Some(*value as f32),
            PrefValue::Float(value) => Some(*value),
        }
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), PrefValue::Float(value));
    }

    fn delete_key(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.save_count = self.save_count.saturating_add(1);
        Ok(())
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file starts empty; a file that
    /// does not parse is logged and replaced on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = read_values(&path)?;
        debug!(path = %path.display(), entries = values.len(), "prefs_opened");
        Ok(Self {
            path,
            values: MemoryStore {
                values,
                save_count: 0,
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, PrefValue>, StoreError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str::<BTreeMap<String, PrefValue>>(&raw) {
        Ok(values) => Ok(values),
        Err(error) => {
            warn!(path = %path.display(), error = %error, "prefs_unreadable_starting_empty");
            Ok(BTreeMap::new())
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn has_key(&self, key: &str) -> bool {
        self.values.has_key(key)
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        self.values.get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.set_int(key, value);
    }

    fn get_float(&self, key: &str) -> Option<f32> {
        self.values.get_float(key)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.values.set_float(key, value);
    }

    fn delete_key(&mut self, key: &str) {
        self.values.delete_key(key);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        write_json_atomic(&self.path, &self.values.values)?;
        debug!(path = %self.path.display(), entries = self.values.len(), "prefs_saved");
        self.values.save()
    }
}
