//! Subcategory assignment.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    TaskClassifier, TrainingKind, record_prediction, record_skipped_feedback, record_training,
};
use crate::config::TrainingConfig;
use crate::features::{CatalogPipeline, Example, FeaturePipeline};
use crate::learner::{MultinomialNb, OnlineLearner};
use crate::source::{DataSource, Resource, fetch_records};
use crate::store::ModelSlot;
use crate::telemetry;
use crate::types::{
    Category, CategoryId, Subcategory, SubcategoryFeedback, SubcategoryId, SubcategoryPrediction,
    TaskKind, TrainOutcome, Transaction, TransactionInput,
};
use crate::{MuninnError, Result};

/// Persisted state of the subcategory task.
///
/// The pipeline's document frequencies, the learner and the subcategory map
/// are always saved and loaded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryModel {
    pipeline: CatalogPipeline,
    learner: MultinomialNb<SubcategoryId>,
    subcategory_map: BTreeMap<SubcategoryId, CategoryId>,
}

impl SubcategoryModel {
    pub fn pipeline(&self) -> &CatalogPipeline {
        &self.pipeline
    }

    pub fn learner(&self) -> &MultinomialNb<SubcategoryId> {
        &self.learner
    }

    /// Subcategory id → owning category id, as of the last full training.
    pub fn subcategory_map(&self) -> &BTreeMap<SubcategoryId, CategoryId> {
        &self.subcategory_map
    }

    /// Replace the subcategory map wholesale.
    pub fn reset_subcategory_map(&mut self, subcategories: &[Subcategory]) {
        self.subcategory_map = subcategories.iter().map(|s| (s.id, s.category)).collect();
    }

    /// Learn `example` → `target`, weighting the learner update `times` times.
    ///
    /// The example counts once towards document frequencies regardless of
    /// `times`.
    pub fn learn(&mut self, example: Example<'_>, target: SubcategoryId, times: u32) {
        let features = self.pipeline.learn_transform(example);
        self.learner.learn_repeated(&features, &target, times);
    }

    /// Predict a subcategory and resolve its category.
    pub fn predict(&self, example: Example<'_>) -> SubcategoryPrediction {
        let features = self.pipeline.transform(example);
        let subcategory_id = self.learner.predict_one(&features);
        let category_id = subcategory_id.and_then(|id| self.subcategory_map.get(&id).copied());
        if let (Some(id), None) = (subcategory_id, category_id) {
            warn!(subcategory_id = id, "predicted subcategory missing from subcategory map");
        }
        SubcategoryPrediction {
            category_id,
            subcategory_id,
        }
    }
}

/// Controller for the subcategory task of one user.
pub struct SubcategoryClassifier {
    slot: ModelSlot,
    source: Arc<dyn DataSource>,
    config: TrainingConfig,
}

impl SubcategoryClassifier {
    pub fn new(slot: ModelSlot, source: Arc<dyn DataSource>, config: TrainingConfig) -> Self {
        Self {
            slot,
            source,
            config,
        }
    }

    /// Predict every transaction against a single load of the model.
    pub fn predict_batch(
        &self,
        transactions: &[TransactionInput],
    ) -> Result<Vec<SubcategoryPrediction>> {
        let model = self.load_model()?;
        Ok(transactions
            .iter()
            .map(|t| {
                let prediction =
                    model.predict(Example::new(t.description.as_str(), t.category_str()));
                record_prediction(TaskKind::Subcategory, outcome_label(&prediction));
                prediction
            })
            .collect())
    }

    /// Fetch a resource required for training; missing or empty is fatal.
    async fn require<T: serde::de::DeserializeOwned>(
        &self,
        resource: Resource,
        credential: &str,
    ) -> Result<Vec<T>> {
        fetch_records(self.source.as_ref(), resource, credential)
            .await
            .filter(|records: &Vec<T>| !records.is_empty())
            .ok_or_else(|| MuninnError::unavailable(resource.path()))
    }

    async fn train_inner(&self, credential: &str) -> Result<TrainOutcome> {
        let categories: Vec<Category> = self.require(Resource::Categories, credential).await?;
        let subcategories: Vec<Subcategory> =
            self.require(Resource::Subcategories, credential).await?;
        let transactions: Vec<Transaction> =
            self.require(Resource::Transactions, credential).await?;

        let lookup = category_lookup(&categories);
        let describe = |id: Option<CategoryId>| {
            id.and_then(|id| lookup.get(&id).map(String::as_str))
                .unwrap_or("")
        };

        let mut model = SubcategoryModel::default();
        model.reset_subcategory_map(&subcategories);

        // Subcategory names first; real transactions afterwards take
        // precedence on ambiguous phrasing. Exact ties still go to the
        // smallest subcategory id, not the first one learned.
        for subcategory in &subcategories {
            let category = describe(Some(subcategory.category));
            let example = Example::new(&subcategory.description, category);
            model.learn(example, subcategory.id, 1);
        }
        for transaction in &transactions {
            let example = Example::new(&transaction.description, describe(transaction.category));
            model.learn(example, transaction.subcategory, 1);
        }

        self.save_model(&model)?;

        let user = self.slot.key().user_id();
        info!(
            user,
            subcategories = subcategories.len(),
            transactions = transactions.len(),
            "trained subcategory model"
        );
        Ok(TrainOutcome::success(format!(
            "model for user {user} trained with {} subcategories and {} transactions",
            subcategories.len(),
            transactions.len()
        ))
        .with_samples(subcategories.len() + transactions.len()))
    }

    async fn retrain_inner(
        &self,
        feedbacks: &[SubcategoryFeedback],
        credential: &str,
    ) -> Result<TrainOutcome> {
        let categories: Vec<Category> =
            fetch_records(self.source.as_ref(), Resource::Categories, credential)
                .await
                .ok_or_else(|| MuninnError::unavailable(Resource::Categories.path()))?;
        let lookup = category_lookup(&categories);

        let mut model = self.load_model()?;
        let weight = self.config.correction_weight;
        let mut corrections = 0;
        let mut feedback_ids = Vec::new();

        for feedback in feedbacks {
            let Some((description, category_id, subcategory_id)) = feedback.required_fields()
            else {
                warn!(id = ?feedback.id, "incomplete feedback, skipped");
                record_skipped_feedback(TaskKind::Subcategory);
                continue;
            };
            feedback_ids.extend(feedback.id);

            if !feedback.is_correction() {
                debug!(id = ?feedback.id, "feedback confirms prediction, nothing to learn");
                continue;
            }

            let category = lookup.get(&category_id).map(String::as_str).unwrap_or("");
            info!(description, weight, "replaying correction");
            model.learn(Example::new(description, category), subcategory_id, weight);
            corrections += 1;
        }

        self.save_model(&model)?;
        metrics::counter!(telemetry::FEEDBACK_CORRECTIONS_TOTAL,
            "task" => TaskKind::Subcategory.as_str(),
        )
        .increment(corrections as u64);

        let user = self.slot.key().user_id();
        Ok(TrainOutcome::success(format!(
            "model for user {user} retrained with {corrections} weighted corrections"
        ))
        .with_corrections(corrections)
        .with_feedback_ids(feedback_ids))
    }
}

#[async_trait]
impl TaskClassifier for SubcategoryClassifier {
    type Feedback = SubcategoryFeedback;
    type Prediction = SubcategoryPrediction;
    type Model = SubcategoryModel;

    fn slot(&self) -> &ModelSlot {
        &self.slot
    }

    async fn train(&self, credential: &str) -> Result<TrainOutcome> {
        let start = Instant::now();
        let result = self.train_inner(credential).await;
        record_training(TaskKind::Subcategory, TrainingKind::Train, start, result.is_ok());
        result
    }

    fn predict(&self, description: &str, category: &str) -> Result<SubcategoryPrediction> {
        let model = self.load_model()?;
        let prediction = model.predict(Example::new(description, category));
        record_prediction(TaskKind::Subcategory, outcome_label(&prediction));
        Ok(prediction)
    }

    async fn retrain_from_feedback(
        &self,
        feedbacks: &[SubcategoryFeedback],
        credential: &str,
    ) -> Result<TrainOutcome> {
        let start = Instant::now();
        let result = self.retrain_inner(feedbacks, credential).await;
        record_training(TaskKind::Subcategory, TrainingKind::Feedback, start, result.is_ok());
        result
    }
}

fn category_lookup(categories: &[Category]) -> HashMap<CategoryId, String> {
    categories
        .iter()
        .map(|c| (c.id, c.description.clone()))
        .collect()
}

fn outcome_label(prediction: &SubcategoryPrediction) -> &'static str {
    if prediction.is_empty() {
        "empty"
    } else {
        "predicted"
    }
}
