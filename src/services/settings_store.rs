// Calm Browsing Buddy Settings Store
// Persists the `settings`, `whitelist` and `stats` keys.
// The file store keeps them in one JSON document at the platform config path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::errors::StoreError;
use crate::types::settings::{StatePatch, StoredState};

/// Key-value contract the coordinator persists through.
///
/// `apply` merges a partial write, last write wins. There is no
/// transaction across writers.
pub trait SettingsStore {
    fn load(&mut self) -> Result<StoredState, StoreError>;
    fn apply(&mut self, patch: StatePatch) -> Result<(), StoreError>;
}

/// Store that persists state as a JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
    state: StoredState,
}

impl JsonFileStore {
    /// Creates a store.
    ///
    /// If `path_override` is `Some`, uses that file. Otherwise, uses
    /// `state.json` under `CALM_BUDDY_DATA_DIR` or the platform config directory.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let path = path_override.unwrap_or_else(platform::state_file_path);
        Self {
            path,
            state: StoredState::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::IoError(format!("Failed to create state directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.state).map_err(|e| {
            StoreError::SerializationError(format!("Failed to serialize state: {}", e))
        })?;

        fs::write(&self.path, json)
            .map_err(|e| StoreError::IoError(format!("Failed to write state file: {}", e)))
    }
}

impl SettingsStore for JsonFileStore {
    /// Loads state from the JSON file.
    ///
    /// If the file does not exist, returns defaults.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<StoredState, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file, using defaults");
            self.state = StoredState::default();
            return Ok(self.state.clone());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::IoError(format!("Failed to read state file: {}", e)))?;

        self.state = serde_json::from_str(&content).map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse state file: {}", e))
        })?;
        Ok(self.state.clone())
    }

    /// Merges `patch` into the cached state and rewrites the file.
    fn apply(&mut self, patch: StatePatch) -> Result<(), StoreError> {
        self.state.merge(patch);
        self.write()
    }
}

/// In-memory store for tests and hosts without a writable disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: StoredState,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoredState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Makes every later `apply` fail without changing the stored state.
    pub fn failing(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn state(&self) -> &StoredState {
        &self.state
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStore for MemoryStore {
    fn load(&mut self) -> Result<StoredState, StoreError> {
        Ok(self.state.clone())
    }

    fn apply(&mut self, patch: StatePatch) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.state.merge(patch);
        self.writes += 1;
        Ok(())
    }
}
