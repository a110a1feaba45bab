//! Model persistence.
//!
//! A [`ModelStore`] keeps one opaque blob per `(user, task)` [`ModelKey`].
//! Blobs are [`ModelArtifact`] envelopes: the learner, its feature pipeline
//! and auxiliary state are always encoded together, so a loaded artifact is
//! self-consistent as of some completed save.
//!
//! [`ModelSlot`] is the persistence handle each task controller is given:
//! it binds a store to a key and adds typed load/save plus status reporting.
//!
//! # Concurrency
//!
//! Stores assume at most one writer per key. Readers racing a writer see
//! either the previous or the new artifact, never a partial one. Serializing
//! concurrent operations for the same user is the caller's responsibility.

mod artifact;
mod file;
mod memory;

pub use artifact::{ARTIFACT_VERSION, ModelArtifact};
pub use file::FileModelStore;
pub use memory::MemoryModelStore;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::types::{TaskKind, TaskStatus};
use crate::{MuninnError, Result};

/// Storage key: one artifact per user per task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey {
    user_id: String,
    task: TaskKind,
}

impl ModelKey {
    /// Build a key, rejecting user ids that are unsafe as file names.
    ///
    /// User ids must be non-empty and use only ASCII alphanumerics, `-` and `_`.
    pub fn new(user_id: impl Into<String>, task: TaskKind) -> Result<Self> {
        let user_id = user_id.into();
        let valid = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(MuninnError::InvalidInput(format!(
                "user id {user_id:?} must be non-empty and contain only ASCII letters, digits, '-' or '_'"
            )));
        }
        Ok(Self { user_id, task })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// `<user_id>_<task>`, unique per key.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.user_id, self.task)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.task)
    }
}

/// Blob persistence for model artifacts.
pub trait ModelStore: Send + Sync {
    /// Read the blob for `key`, or `None` if nothing was saved.
    fn read(&self, key: &ModelKey) -> Result<Option<Vec<u8>>>;

    /// Replace the blob for `key`. Readers never observe a partial write.
    fn write(&self, key: &ModelKey, blob: &[u8]) -> Result<()>;

    /// Remove the blob for `key`. Removing a missing blob is not an error.
    fn delete(&self, key: &ModelKey) -> Result<()>;

    /// When the blob for `key` was last written, or `None` if it doesn't exist.
    fn last_modified(&self, key: &ModelKey) -> Result<Option<DateTime<Utc>>>;

    /// Whether a blob exists for `key`.
    fn exists(&self, key: &ModelKey) -> Result<bool> {
        Ok(self.last_modified(key)?.is_some())
    }
}

/// A store bound to one `(user, task)` key.
#[derive(Clone)]
pub struct ModelSlot {
    store: Arc<dyn ModelStore>,
    key: ModelKey,
}

impl ModelSlot {
    pub fn new(store: Arc<dyn ModelStore>, key: ModelKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    /// Load the persisted state, or `None` when untrained.
    pub fn load_existing<S: DeserializeOwned>(&self) -> Result<Option<S>> {
        match self.store.read(&self.key)? {
            Some(blob) => {
                let artifact = ModelArtifact::<S>::decode(&blob, self.key.task())?;
                debug!(key = %self.key, saved_at = %artifact.saved_at, "loaded model artifact");
                Ok(Some(artifact.state))
            }
            None => {
                debug!(key = %self.key, "no model artifact, using empty model");
                Ok(None)
            }
        }
    }

    /// Load the persisted state, or a fresh empty one when untrained.
    pub fn load<S: DeserializeOwned + Default>(&self) -> Result<S> {
        Ok(self.load_existing()?.unwrap_or_default())
    }

    /// Persist `state`, replacing any previous artifact.
    pub fn save<S: Serialize>(&self, state: &S) -> Result<()> {
        let artifact = ModelArtifact::new(self.key.task(), state);
        let blob = artifact.encode()?;
        self.store.write(&self.key, &blob)?;
        info!(key = %self.key, bytes = blob.len(), "saved model artifact");
        Ok(())
    }

    /// Remove the persisted artifact, if any.
    pub fn delete(&self) -> Result<()> {
        self.store.delete(&self.key)?;
        debug!(key = %self.key, "deleted model artifact");
        Ok(())
    }

    pub fn is_trained(&self) -> Result<bool> {
        self.store.exists(&self.key)
    }

    pub fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        self.store.last_modified(&self.key)
    }

    /// Training status for this slot's task.
    pub fn status(&self) -> Result<TaskStatus> {
        let last_trained = self.last_modified()?;
        Ok(TaskStatus {
            task: self.key.task(),
            trained: last_trained.is_some(),
            last_trained,
            actions: self.key.task().actions(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_rejects_path_characters() {
        assert!(ModelKey::new("../etc", TaskKind::Subcategory).is_err());
        assert!(ModelKey::new("", TaskKind::Subcategory).is_err());
        assert!(ModelKey::new("user 1", TaskKind::Subcategory).is_err());
    }

    #[test]
    fn key_file_stem_includes_task() {
        let key = ModelKey::new("42", TaskKind::Description).unwrap();
        assert_eq!(key.file_stem(), "42_description");
        assert_eq!(key.to_string(), "42/description");
    }
}
