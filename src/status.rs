//! Per-user training status across all tasks.

use std::sync::Arc;

use crate::Result;
use crate::store::{ModelKey, ModelSlot, ModelStore};
use crate::types::{TaskKind, TaskStatus};

/// Reports, for one user, which tasks have a persisted model.
///
/// Status is derived from the store alone; no artifact is decoded.
#[derive(Clone)]
pub struct StatusAggregator {
    store: Arc<dyn ModelStore>,
}

impl StatusAggregator {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self { store }
    }

    /// One entry per known task, in [`TaskKind::ALL`] order.
    pub fn status(&self, user_id: &str) -> Result<Vec<TaskStatus>> {
        TaskKind::ALL
            .iter()
            .map(|&task| {
                let key = ModelKey::new(user_id, task)?;
                ModelSlot::new(self.store.clone(), key).status()
            })
            .collect()
    }
}
