//! Per-task training status reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskKind;

/// Which actions a task exposes to the request layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskActions {
    /// Full bootstrap training from catalog and history.
    pub train: bool,
    /// Retraining from user feedback.
    pub feedback: bool,
}

impl TaskActions {
    /// Task supports both bootstrap training and feedback.
    pub fn train_and_feedback() -> Self {
        Self {
            train: true,
            feedback: true,
        }
    }

    /// Task only learns from feedback.
    pub fn feedback_only() -> Self {
        Self {
            feedback: true,
            ..Default::default()
        }
    }
}

/// Training status of one task's model for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task: TaskKind,
    /// Whether a persisted artifact exists.
    pub trained: bool,
    /// When the artifact was last written, if it exists.
    pub last_trained: Option<DateTime<Utc>>,
    pub actions: TaskActions,
}
