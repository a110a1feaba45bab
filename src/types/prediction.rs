//! Prediction result shapes

use serde::{Deserialize, Serialize};

use super::{CategoryId, SubcategoryId};

/// Predicted subcategory and the category it belongs to.
///
/// Both fields are `None` when the model has nothing to predict from.
/// `category_id` alone is `None` when the predicted subcategory is absent
/// from the persisted subcategory map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryPrediction {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
}

impl SubcategoryPrediction {
    /// Whether no prediction was available.
    pub fn is_empty(&self) -> bool {
        self.subcategory_id.is_none()
    }
}

/// Which branch of description correction produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionOutcome {
    /// A corrected description is suggested.
    Corrected,
    /// The model predicts the input itself, or has nothing to predict.
    NoCorrection,
    /// The best candidate fell below the confidence threshold.
    LowConfidence,
    /// No token of the input was ever seen in training.
    Unseen,
}

impl CorrectionOutcome {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionOutcome::Corrected => "corrected",
            CorrectionOutcome::NoCorrection => "no_correction",
            CorrectionOutcome::LowConfidence => "low_confidence",
            CorrectionOutcome::Unseen => "unseen",
        }
    }
}

/// Result of a description-correction prediction.
///
/// Every branch produces the same shape: `prediction` is only set for
/// [`CorrectionOutcome::Corrected`], `confidence` whenever the learner
/// produced a probability for its candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub outcome: CorrectionOutcome,
    pub prediction: Option<String>,
    pub confidence: Option<f64>,
    pub message: String,
}

impl CorrectionResult {
    pub fn corrected(prediction: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            outcome: CorrectionOutcome::Corrected,
            prediction: Some(prediction.into()),
            confidence,
            message: "correction suggested".to_string(),
        }
    }

    pub fn no_correction(confidence: Option<f64>) -> Self {
        Self {
            outcome: CorrectionOutcome::NoCorrection,
            prediction: None,
            confidence,
            message: "no correction suggested".to_string(),
        }
    }

    pub fn low_confidence(confidence: f64) -> Self {
        Self {
            outcome: CorrectionOutcome::LowConfidence,
            prediction: None,
            confidence: Some(confidence),
            message: "low confidence, no correction suggested".to_string(),
        }
    }

    pub fn unseen() -> Self {
        Self {
            outcome: CorrectionOutcome::Unseen,
            prediction: None,
            confidence: None,
            message: "input is unseen by the model".to_string(),
        }
    }
}
