//! Versioned artifact envelope.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::TaskKind;
use crate::{MuninnError, Result};

/// Current artifact format version; newer versions are rejected on load.
pub const ARTIFACT_VERSION: u32 = 1;

/// Persisted model state for one task, with format metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact<S> {
    pub version: u32,
    pub task: TaskKind,
    pub saved_at: DateTime<Utc>,
    pub state: S,
}

/// Envelope fields checked before the state is decoded.
#[derive(Deserialize)]
struct Header {
    version: u32,
    task: TaskKind,
}

impl<S> ModelArtifact<S> {
    /// Wrap `state` for saving now.
    pub fn new(task: TaskKind, state: S) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            task,
            saved_at: Utc::now(),
            state,
        }
    }
}

impl<S: Serialize> ModelArtifact<S> {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| MuninnError::Artifact(format!("failed to encode artifact: {e}")))
    }
}

impl<S: DeserializeOwned> ModelArtifact<S> {
    /// Decode an artifact saved for `expected` task.
    pub fn decode(bytes: &[u8], expected: TaskKind) -> Result<Self> {
        let header: Header = serde_json::from_slice(bytes)
            .map_err(|e| MuninnError::Artifact(format!("failed to parse artifact: {e}")))?;
        if header.version > ARTIFACT_VERSION {
            return Err(MuninnError::Artifact(format!(
                "unsupported artifact version {} (max supported: {ARTIFACT_VERSION})",
                header.version
            )));
        }
        if header.task != expected {
            return Err(MuninnError::Artifact(format!(
                "artifact belongs to task {}, expected {expected}",
                header.task
            )));
        }
        serde_json::from_slice(bytes)
            .map_err(|e| MuninnError::Artifact(format!("failed to decode artifact state: {e}")))
    }
}
