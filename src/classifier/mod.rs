//! Task controllers.
//!
//! Each labeling task has a controller implementing [`TaskClassifier`]:
//!
//! - [`SubcategoryClassifier`] — bootstrap training from the user's catalog
//!   and labeled history, subcategory prediction, and fixed-weight
//!   correction replay.
//! - [`DescriptionClassifier`] — description correction trained from
//!   feedback, with out-of-vocabulary and confidence gating, and
//!   frequency-weighted correction replay.
//!
//! Controllers share persistence and status through an injected
//! [`ModelSlot`]; they hold no model state between calls; every operation
//! loads the artifact it needs and saves what it changed.

mod description;
mod subcategory;

pub use description::{DescriptionClassifier, DescriptionModel, suggest_correction};
pub use subcategory::{SubcategoryClassifier, SubcategoryModel};

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::store::ModelSlot;
use crate::telemetry;
use crate::types::{TaskKind, TaskStatus, TrainOutcome};

/// Contract shared by every task controller.
#[async_trait]
pub trait TaskClassifier: Send + Sync {
    /// Feedback record type accepted by [`retrain_from_feedback`](Self::retrain_from_feedback).
    type Feedback: Send + Sync;
    /// Result of [`predict`](Self::predict).
    type Prediction;
    /// Persisted state: learner, feature pipeline and auxiliary state.
    type Model: Serialize + DeserializeOwned + Default + Send;

    /// Persistence handle for this controller's `(user, task)` artifact.
    fn slot(&self) -> &ModelSlot;

    /// Load the persisted model, or an empty one when untrained.
    fn load_model(&self) -> Result<Self::Model> {
        self.slot().load()
    }

    /// Persist `model`, replacing the previous artifact.
    fn save_model(&self, model: &Self::Model) -> Result<()> {
        self.slot().save(model)
    }

    fn task(&self) -> TaskKind {
        self.slot().key().task()
    }

    /// Train a fresh model from upstream data and persist it.
    async fn train(&self, credential: &str) -> Result<TrainOutcome>;

    /// Predict from the persisted model. An untrained model is not an error.
    fn predict(&self, description: &str, category: &str) -> Result<Self::Prediction>;

    /// Replay corrections from `feedbacks` into the persisted model.
    async fn retrain_from_feedback(
        &self,
        feedbacks: &[Self::Feedback],
        credential: &str,
    ) -> Result<TrainOutcome>;

    fn is_trained(&self) -> Result<bool> {
        self.slot().is_trained()
    }

    fn status(&self) -> Result<TaskStatus> {
        self.slot().status()
    }
}

/// Which training path produced a metric sample.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TrainingKind {
    Train,
    Feedback,
}

impl TrainingKind {
    fn as_str(&self) -> &'static str {
        match self {
            TrainingKind::Train => "train",
            TrainingKind::Feedback => "feedback",
        }
    }
}

/// Record training outcome metrics (counter + histogram).
pub(crate) fn record_training(task: TaskKind, kind: TrainingKind, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::TRAININGS_TOTAL,
        "task" => task.as_str(),
        "kind" => kind.as_str(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::TRAINING_DURATION_SECONDS,
        "task" => task.as_str(),
        "kind" => kind.as_str(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one served prediction.
pub(crate) fn record_prediction(task: TaskKind, outcome: &'static str) {
    metrics::counter!(telemetry::PREDICTIONS_TOTAL,
        "task" => task.as_str(),
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record a feedback record skipped for missing fields.
pub(crate) fn record_skipped_feedback(task: TaskKind) {
    metrics::counter!(telemetry::SKIPPED_RECORDS_TOTAL,
        "resource" => "feedback",
        "task" => task.as_str(),
    )
    .increment(1);
}
