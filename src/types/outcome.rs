//! Uniform result shape for training operations

use serde::{Deserialize, Serialize};

use super::FeedbackId;
use crate::Result;

/// Outcome of `train` or `retrain_from_feedback`.
///
/// Failures reach the boundary layer in the same shape with
/// `success: false`; see [`TrainOutcome::from_result`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub success: bool,
    pub message: String,
    /// Number of examples learned during a bootstrap training pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,
    /// Number of corrections replayed during feedback retraining.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrections: Option<usize>,
    /// Ids of complete feedback records that were consumed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feedback_ids: Vec<FeedbackId>,
    /// Fraction of training examples the fresh model reproduces exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_sample_accuracy: Option<f64>,
}

impl TrainOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            samples: None,
            corrections: None,
            feedback_ids: Vec::new(),
            in_sample_accuracy: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message)
        }
    }

    /// Fold a controller error into the uniform failure shape.
    pub fn from_result(result: Result<Self>) -> Self {
        result.unwrap_or_else(|e| Self::failure(e.to_string()))
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_corrections(mut self, corrections: usize) -> Self {
        self.corrections = Some(corrections);
        self
    }

    pub fn with_feedback_ids(mut self, ids: Vec<FeedbackId>) -> Self {
        self.feedback_ids = ids;
        self
    }

    pub fn with_in_sample_accuracy(mut self, accuracy: f64) -> Self {
        self.in_sample_accuracy = Some(accuracy);
        self
    }
}
