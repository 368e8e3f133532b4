//! `KeyValueStore` implementations for the approval workflow.
//!
//! `MemoryStore` keeps values in a `HashMap` behind a `Mutex` and lives as
//! long as the process. `FileStore` keeps one file per key under a
//! directory, so state survives between CLI invocations.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use panelgate_contracts::error::{GateError, GateResult};
use panelgate_core::traits::KeyValueStore;

// ── Memory ────────────────────────────────────────────────────────────────────

/// A process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> GateResult<Option<String>> {
        let values = self.values.lock().map_err(|e| GateError::Store {
            reason: format!("memory store lock poisoned: {}", e),
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> GateResult<()> {
        let mut values = self.values.lock().map_err(|e| GateError::Store {
            reason: format!("memory store lock poisoned: {}", e),
        })?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

/// A store that keeps each key in `<dir>/<key>.json`.
///
/// The directory is created on first write. Keys are used as file names
/// verbatim, so they must not contain path separators.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> GateResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(GateError::Store {
                reason: format!("invalid store key '{}'", key),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> GateResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GateError::Store {
                reason: format!("failed to read '{}': {}", path.display(), e),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> GateResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| GateError::Store {
            reason: format!("failed to create store directory '{}': {}", self.dir.display(), e),
        })?;
        fs::write(&path, value).map_err(|e| GateError::Store {
            reason: format!("failed to write '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), bytes = value.len(), "store value written");
        Ok(())
    }
}
