//! Persistence for the task collection.
//!
//! The collection is written as one JSON record under a fixed key of a
//! [`KeyValueSlot`]:
//!
//! ```text
//! { "state": { "tasks": [ ... ] }, "version": 0 }
//! ```
//!
//! Only the tasks are persisted. View state (filter, sort, edit target)
//! never reaches storage.
//!
//! [`TaskPersistence::load`] and [`TaskPersistence::save`] never fail: read
//! problems yield an empty collection and write problems are logged. The
//! `try_*` variants expose the underlying error.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::task::Task;

/// Key the task collection is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "task-storage";

/// Current schema version of the persisted record.
pub const SCHEMA_VERSION: u32 = 0;

/// A durable string slot addressed by key.
pub trait KeyValueSlot {
    /// Read the value stored under `key`, `None` when nothing was written.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        write_atomic(&self.path_for(key), value.as_bytes())
    }
}

/// Write data atomically using temp file + rename
///
/// Readers see either the previous snapshot or the new one, never a partial
/// write.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    let result = written.and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// In-process slot.
///
/// `set_failing(true)` makes every read and write return an error, which
/// stands in for storage that is full or unavailable.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    failing: bool,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Raw stored value, bypassing the failure switch.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn unavailable() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "storage unavailable")
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        if self.failing {
            return Err(Self::unavailable());
        }
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        if self.failing {
            return Err(Self::unavailable());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Persisted task state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskState {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// The record written to the slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedState {
    pub state: TaskState,
    pub version: u32,
}

/// Reads and writes the task collection through a [`KeyValueSlot`].
#[derive(Debug, Clone)]
pub struct TaskPersistence<S> {
    slot: S,
    key: String,
    version: u32,
}

impl<S: KeyValueSlot> TaskPersistence<S> {
    /// Persistence under the default key and current schema version.
    pub fn new(slot: S) -> Self {
        Self::with_key(slot, DEFAULT_STORAGE_KEY, SCHEMA_VERSION)
    }

    pub fn with_key(slot: S, key: impl Into<String>, version: u32) -> Self {
        Self {
            slot,
            key: key.into(),
            version,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }

    /// Load the stored collection, or an empty one when nothing usable is
    /// stored.
    pub fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to load tasks; starting empty");
                Vec::new()
            }
        }
    }

    /// Load the stored collection. `Ok(None)` when nothing was stored.
    pub fn try_load(&self) -> Result<Option<Vec<Task>>> {
        let Some(content) = self.slot.read(&self.key)? else {
            return Ok(None);
        };
        let record: PersistedState = serde_json::from_str(&content)?;
        if record.version != self.version {
            return Err(Error::VersionMismatch {
                found: record.version,
                expected: self.version,
            });
        }
        debug!(key = %self.key, tasks = record.state.tasks.len(), "loaded tasks");
        Ok(Some(record.state.tasks))
    }

    /// Write the collection, logging and dropping any failure.
    pub fn save(&mut self, tasks: &[Task]) {
        if let Err(err) = self.try_save(tasks) {
            warn!(key = %self.key, error = %err, "failed to persist tasks");
        }
    }

    /// Write the collection.
    pub fn try_save(&mut self, tasks: &[Task]) -> Result<()> {
        let record = PersistedState {
            state: TaskState {
                tasks: tasks.to_vec(),
            },
            version: self.version,
        };
        let json = serde_json::to_string(&record)?;
        self.slot.write(&self.key, &json)?;
        Ok(())
    }
}
