//! Labeling task identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TaskActions;
use crate::MuninnError;

/// The two labeling tasks a user can have a model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Map a transaction description (plus optional category hint) to a
    /// subcategory id.
    Subcategory,
    /// Map a raw transaction description to a corrected description.
    Description,
}

impl TaskKind {
    /// Every task, in reporting order.
    pub const ALL: [TaskKind; 2] = [TaskKind::Subcategory, TaskKind::Description];

    /// Stable identifier used in storage keys, metrics labels and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Subcategory => "subcategory",
            TaskKind::Description => "description",
        }
    }

    /// Actions the request layer exposes for this task.
    ///
    /// Description correction is feedback-only: its `train` exists on the
    /// controller but is not offered as a public action.
    pub fn actions(&self) -> TaskActions {
        match self {
            TaskKind::Subcategory => TaskActions::train_and_feedback(),
            TaskKind::Description => TaskActions::feedback_only(),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = MuninnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subcategory" => Ok(TaskKind::Subcategory),
            "description" => Ok(TaskKind::Description),
            other => Err(MuninnError::InvalidInput(format!("unknown task: {other}"))),
        }
    }
}
