//! Snapshot persistence.
//!
//! A [`SnapshotStore`] writes the ordered line texts as `{"data": [...]}`
//! under a single key of a [`KeyValueStore`] backend. Attributes are never
//! stored; they are recomputed by the classifier on load.

mod file;
mod memory;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key the snapshot is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "values";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored value exists but is not a valid snapshot.
    #[error("stored value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A durable string key-value slot.
pub trait KeyValueStore {
    /// # Errors
    /// Backend-specific read failures.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key` in one write.
    ///
    /// # Errors
    /// Backend-specific write failures.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    /// Backend-specific write failures.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Serialized form of a line sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub data: Vec<String>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    data: &'a [String],
}

/// Saves and loads the line sequence under one fixed key.
#[derive(Debug, Clone)]
pub struct SnapshotStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    /// Store under [`DEFAULT_KEY`].
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, DEFAULT_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Write `lines` as the current snapshot.
    ///
    /// # Errors
    /// Only backend write failures; encoding a string list cannot fail in practice.
    pub fn save(&mut self, lines: &[String]) -> Result<(), StoreError> {
        let json = serde_json::to_string(&SnapshotRef { data: lines }).map_err(StoreError::Encode)?;
        self.backend.set(&self.key, &json)
    }

    /// Read the current snapshot. `None` if nothing was ever saved.
    ///
    /// # Errors
    /// [`StoreError::Corrupt`] if the stored value is not a snapshot, or a
    /// backend read failure.
    pub fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        let Some(json) = self.backend.get(&self.key)? else {
            return Ok(None);
        };
        let snapshot: PersistedSnapshot =
            serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                key: self.key.clone(),
                source,
            })?;
        Ok(Some(snapshot.data))
    }

    /// Forget the saved snapshot.
    ///
    /// # Errors
    /// Backend write failures.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)
    }
}
