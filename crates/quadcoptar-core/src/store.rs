//! Round-end score handoff.
//!
//! When a round ends the final score is written under [`SCORE_KEY`]. The
//! store is a small key/value seam so a host can persist wherever it likes;
//! [`InMemoryScoreStore`] and [`JsonFileScoreStore`] cover tests and the
//! headless driver.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Key the final score is stored under.
pub const SCORE_KEY: &str = "score";

/// Persistent key/value storage for scores.
pub trait ScoreStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the value could not be persisted.
    fn write_score(&self, key: &str, value: u32) -> Result<(), StoreError>;

    /// Reads the value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be read.
    fn read_score(&self, key: &str) -> Result<Option<u32>, StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    values: Mutex<BTreeMap<String, u32>>,
}

impl InMemoryScoreStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn write_score(&self, key: &str, value: u32) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn read_score(&self, key: &str) -> Result<Option<u32>, StoreError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied())
    }
}

/// Store backed by a JSON object file, e.g. `{"score": 12}`.
///
/// Other keys already present in the file are preserved whatever their
/// value type. Reading a key whose value is not a `u32` yields `None`.
#[derive(Debug)]
pub struct JsonFileScoreStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileScoreStore {
    /// Creates a store for `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn write_score(&self, key: &str, value: u32) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        values.insert(key.to_string(), Value::from(value));
        let text = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn read_score(&self, key: &str) -> Result<Option<u32>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self
            .load()?
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok()))
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for std::sync::Arc<S> {
    fn write_score(&self, key: &str, value: u32) -> Result<(), StoreError> {
        (**self).write_score(key, value)
    }

    fn read_score(&self, key: &str) -> Result<Option<u32>, StoreError> {
        (**self).read_score(key)
    }
}
