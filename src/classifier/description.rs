//! Description correction.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    TaskClassifier, TrainingKind, record_prediction, record_skipped_feedback, record_training,
};
use crate::config::TrainingConfig;
use crate::features::{BagOfWords, Example, FeaturePipeline, TrainingExample, whitespace_tokens};
use crate::learner::{MultinomialNb, OnlineLearner};
use crate::source::{DataSource, Resource, fetch_records};
use crate::store::ModelSlot;
use crate::telemetry;
use crate::types::{CorrectionResult, DescriptionFeedback, TaskKind, TrainOutcome};
use crate::{MuninnError, Result};

/// Persisted state of the description-correction task.
///
/// The vocabulary lives in the bag-of-words pipeline and is saved with the
/// learner it was built alongside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionModel {
    pipeline: BagOfWords,
    learner: MultinomialNb<String>,
}

impl DescriptionModel {
    pub fn pipeline(&self) -> &BagOfWords {
        &self.pipeline
    }

    pub fn learner(&self) -> &MultinomialNb<String> {
        &self.learner
    }

    /// Learn `description` → `corrected`, weighting the learner update
    /// `times` times. The description's tokens join the vocabulary once.
    pub fn learn(&mut self, description: &str, corrected: &str, times: u32) {
        let features = self
            .pipeline
            .learn_transform(Example::description(description));
        self.learner
            .learn_repeated(&features, &corrected.to_string(), times);
    }

    /// Suggest a correction for `description`.
    pub fn predict(&self, description: &str, min_confidence: f64) -> CorrectionResult {
        suggest_correction(&self.pipeline, &self.learner, description, min_confidence)
    }

    /// Fraction of `examples` whose target the model reproduces exactly, or
    /// `None` for an empty set.
    pub fn in_sample_accuracy(&self, examples: &[TrainingExample<String>]) -> Option<f64> {
        if examples.is_empty() {
            return None;
        }
        let hits = examples
            .iter()
            .filter(|example| {
                let features = self.pipeline.transform(example.example());
                self.learner.predict_one(&features).as_ref() == Some(&example.target)
            })
            .count();
        Some(hits as f64 / examples.len() as f64)
    }
}

/// Gate a learner's suggestion for `description`.
///
/// In order: input sharing no token with the vocabulary is
/// [`unseen`](CorrectionResult::unseen) without consulting the learner; a
/// learner with nothing learned suggests nothing; a probability below
/// `min_confidence` is [`low_confidence`](CorrectionResult::low_confidence)
/// (skipped when the learner has no probabilities); a prediction that
/// normalizes to the input itself is no correction.
pub fn suggest_correction<M>(
    pipeline: &BagOfWords,
    learner: &M,
    description: &str,
    min_confidence: f64,
) -> CorrectionResult
where
    M: OnlineLearner<Label = String>,
{
    if pipeline.is_unseen(description) {
        return CorrectionResult::unseen();
    }

    let features = pipeline.transform(Example::description(description));
    let Some(prediction) = learner.predict_one(&features) else {
        return CorrectionResult::no_correction(None);
    };

    let confidence = learner
        .predict_proba_one(&features)
        .map(|proba| proba.get(&prediction).copied().unwrap_or(0.0));
    if let Some(confidence) = confidence {
        if confidence < min_confidence {
            return CorrectionResult::low_confidence(confidence);
        }
    }

    if whitespace_tokens(&prediction) == whitespace_tokens(description) {
        return CorrectionResult::no_correction(confidence);
    }

    CorrectionResult::corrected(prediction, confidence)
}

/// Controller for the description-correction task of one user.
pub struct DescriptionClassifier {
    slot: ModelSlot,
    source: Arc<dyn DataSource>,
    config: TrainingConfig,
}

impl DescriptionClassifier {
    pub fn new(slot: ModelSlot, source: Arc<dyn DataSource>, config: TrainingConfig) -> Self {
        Self {
            slot,
            source,
            config,
        }
    }

    async fn train_inner(&self, credential: &str) -> Result<TrainOutcome> {
        let resource = Resource::CategorizationFeedback;
        let feedbacks: Vec<DescriptionFeedback> =
            fetch_records(self.source.as_ref(), resource, credential)
                .await
                .filter(|records: &Vec<DescriptionFeedback>| !records.is_empty())
                .ok_or_else(|| MuninnError::unavailable(resource.path()))?;

        self.slot.delete()?;
        let mut model = DescriptionModel::default();
        let mut examples = Vec::new();

        for feedback in &feedbacks {
            match feedback.correction() {
                Some((description, corrected)) => {
                    model.learn(description, corrected, 1);
                    examples.push(TrainingExample::new(description, "", corrected.to_string()));
                }
                None if !feedback.is_complete() => {
                    warn!(id = ?feedback.id, "incomplete feedback, skipped");
                    record_skipped_feedback(TaskKind::Description);
                }
                None => debug!(id = ?feedback.id, "description unchanged, nothing to learn"),
            }
        }

        if examples.len() < self.config.min_samples {
            warn!(
                samples = examples.len(),
                min_samples = self.config.min_samples,
                "few usable corrections, predictions will have low confidence"
            );
        }

        let accuracy = model.in_sample_accuracy(&examples);
        if let Some(accuracy) = accuracy {
            info!(accuracy, samples = examples.len(), "in-sample accuracy");
        }

        self.save_model(&model)?;

        let user = self.slot.key().user_id();
        let outcome = TrainOutcome::success(format!(
            "description model for user {user} trained with {} corrections",
            examples.len()
        ))
        .with_samples(examples.len());
        Ok(match accuracy {
            Some(accuracy) => outcome.with_in_sample_accuracy(accuracy),
            None => outcome,
        })
    }

    fn retrain_inner(&self, feedbacks: &[DescriptionFeedback]) -> Result<TrainOutcome> {
        let mut corrections = Vec::new();
        let mut feedback_ids = Vec::new();
        for feedback in feedbacks {
            if !feedback.is_complete() {
                warn!(id = ?feedback.id, "incomplete feedback, skipped");
                record_skipped_feedback(TaskKind::Description);
                continue;
            }
            feedback_ids.extend(feedback.id);
            if let Some(pair) = feedback.correction() {
                corrections.push(pair);
            }
        }

        let mut frequency: BTreeMap<&str, u32> = BTreeMap::new();
        for (_, corrected) in &corrections {
            *frequency.entry(*corrected).or_insert(0) += 1;
        }

        let mut model = self.load_model()?;
        for (description, corrected) in &corrections {
            let weight = frequency.get(corrected).copied().unwrap_or(1);
            debug!(description, corrected, weight, "replaying correction");
            model.learn(description, corrected, weight);
        }
        self.save_model(&model)?;

        metrics::counter!(telemetry::FEEDBACK_CORRECTIONS_TOTAL,
            "task" => TaskKind::Description.as_str(),
        )
        .increment(corrections.len() as u64);

        let user = self.slot.key().user_id();
        Ok(TrainOutcome::success(format!(
            "description model for user {user} retrained with {} corrections",
            corrections.len()
        ))
        .with_corrections(corrections.len())
        .with_feedback_ids(feedback_ids))
    }
}

#[async_trait]
impl TaskClassifier for DescriptionClassifier {
    type Feedback = DescriptionFeedback;
    type Prediction = CorrectionResult;
    type Model = DescriptionModel;

    fn slot(&self) -> &ModelSlot {
        &self.slot
    }

    async fn train(&self, credential: &str) -> Result<TrainOutcome> {
        let start = Instant::now();
        let result = self.train_inner(credential).await;
        record_training(TaskKind::Description, TrainingKind::Train, start, result.is_ok());
        result
    }

    /// The category hint is ignored.
    fn predict(&self, description: &str, _category: &str) -> Result<CorrectionResult> {
        let model = self.load_model()?;
        let result = model.predict(description, self.config.min_confidence);
        record_prediction(TaskKind::Description, result.outcome.as_str());
        Ok(result)
    }

    /// The credential is unused: description retraining needs no upstream data.
    async fn retrain_from_feedback(
        &self,
        feedbacks: &[DescriptionFeedback],
        _credential: &str,
    ) -> Result<TrainOutcome> {
        let start = Instant::now();
        let result = self.retrain_inner(feedbacks);
        record_training(TaskKind::Description, TrainingKind::Feedback, start, result.is_ok());
        result
    }
}
