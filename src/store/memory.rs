//! In-process model store.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{ModelKey, ModelStore};
use crate::{MuninnError, Result};

/// Thread-safe in-memory store, for embedding and tests.
///
/// Each write swaps the whole blob under a write lock.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    entries: RwLock<HashMap<ModelKey, (Vec<u8>, DateTime<Utc>)>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(e: impl std::fmt::Display) -> MuninnError {
    MuninnError::Storage(format!("model store lock poisoned: {e}"))
}

impl ModelStore for MemoryModelStore {
    fn read(&self, key: &ModelKey) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).map(|(blob, _)| blob.clone()))
    }

    fn write(&self, key: &ModelKey, blob: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.clone(), (blob.to_vec(), Utc::now()));
        Ok(())
    }

    fn delete(&self, key: &ModelKey) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn last_modified(&self, key: &ModelKey) -> Result<Option<DateTime<Utc>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).map(|(_, at)| *at))
    }
}
