//! Records supplied by the upstream data source and the request layer

use serde::{Deserialize, Serialize};

use super::TextInput;

pub type CategoryId = i64;
pub type SubcategoryId = i64;
pub type FeedbackId = i64;

/// A top-level spending category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub description: String,
}

/// A subcategory belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub description: String,
    pub category: CategoryId,
}

/// A historical transaction already labeled by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub subcategory: SubcategoryId,
}

/// User feedback on a subcategory prediction.
///
/// Fields are optional on the wire; only records carrying a description, a
/// corrected category and a corrected subcategory are usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryFeedback {
    #[serde(default)]
    pub id: Option<FeedbackId>,
    #[serde(default)]
    pub description: Option<TextInput>,
    #[serde(default)]
    pub predicted_subcategory_id: Option<SubcategoryId>,
    #[serde(default)]
    pub corrected_category_id: Option<CategoryId>,
    #[serde(default)]
    pub corrected_subcategory_id: Option<SubcategoryId>,
}

impl SubcategoryFeedback {
    /// A correction is feedback whose corrected label differs from the prediction.
    pub fn is_correction(&self) -> bool {
        self.predicted_subcategory_id != self.corrected_subcategory_id
    }

    /// The `(description, corrected category, corrected subcategory)` triple,
    /// or `None` when any required field is missing.
    pub fn required_fields(&self) -> Option<(&str, CategoryId, SubcategoryId)> {
        let description = self.description.as_ref().filter(|d| !d.is_blank())?;
        Some((
            description.as_str(),
            self.corrected_category_id?,
            self.corrected_subcategory_id?,
        ))
    }
}

/// User feedback on a description: the raw text and what it should read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionFeedback {
    #[serde(default)]
    pub id: Option<FeedbackId>,
    #[serde(default)]
    pub description: Option<TextInput>,
    #[serde(default)]
    pub corrected_description: Option<TextInput>,
}

impl DescriptionFeedback {
    pub fn new(description: impl Into<TextInput>, corrected: impl Into<TextInput>) -> Self {
        Self {
            id: None,
            description: Some(description.into()),
            corrected_description: Some(corrected.into()),
        }
    }

    /// The `(description, corrected description)` pair when both are present
    /// and they differ.
    pub fn correction(&self) -> Option<(&str, &str)> {
        let description = self.description.as_ref().filter(|d| !d.is_blank())?;
        let corrected = self
            .corrected_description
            .as_ref()
            .filter(|d| !d.is_blank())?;
        (description != corrected).then(|| (description.as_str(), corrected.as_str()))
    }

    /// Whether both fields are present, regardless of whether they differ.
    pub fn is_complete(&self) -> bool {
        self.description.as_ref().is_some_and(|d| !d.is_blank())
            && self
                .corrected_description
                .as_ref()
                .is_some_and(|d| !d.is_blank())
    }
}

/// A transaction submitted for prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub description: TextInput,
    #[serde(default)]
    pub category: Option<TextInput>,
}

impl TransactionInput {
    pub fn new(description: impl Into<TextInput>) -> Self {
        Self {
            description: description.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<TextInput>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Category hint, empty when absent.
    pub fn category_str(&self) -> &str {
        self.category.as_ref().map(TextInput::as_str).unwrap_or("")
    }
}
