//! Feature extraction.
//!
//! Two [`FeaturePipeline`] strategies turn a `(description, category)` pair
//! into sparse [`Features`]:
//!
//! - [`CatalogPipeline`] — online TF-IDF over description words joined with a
//!   one-hot encoding of the category. Used by the subcategory task.
//! - [`BagOfWords`] — whitespace tokens with per-description term
//!   frequencies, plus a global [`Vocabulary`] for out-of-vocabulary
//!   detection. Used by the description-correction task.
//!
//! Pipelines only change state in [`FeaturePipeline::learn`]; transforming
//! an input for prediction never mutates them.

mod bag_of_words;
mod catalog;
mod text;

pub use bag_of_words::{BagOfWords, Vocabulary};
pub use catalog::CatalogPipeline;
pub use text::{normalize, whitespace_tokens, word_tokens};

use std::collections::BTreeMap;

/// Sparse feature vector: feature name → value.
///
/// Ordered so that learning and prediction iterate deterministically.
pub type Features = BTreeMap<String, f64>;

/// A single input to featurize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example<'a> {
    pub description: &'a str,
    /// Category hint; empty when the caller has none.
    pub category: &'a str,
}

impl<'a> Example<'a> {
    pub fn new(description: &'a str, category: &'a str) -> Self {
        Self {
            description,
            category,
        }
    }

    /// An example without a category hint.
    pub fn description(description: &'a str) -> Self {
        Self::new(description, "")
    }
}

/// An example paired with its target label, built per training iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample<L> {
    pub description: String,
    pub category: String,
    pub target: L,
}

impl<L> TrainingExample<L> {
    pub fn new(description: impl Into<String>, category: impl Into<String>, target: L) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
            target,
        }
    }

    pub fn example(&self) -> Example<'_> {
        Example::new(&self.description, &self.category)
    }
}

/// Strategy turning examples into features.
pub trait FeaturePipeline {
    /// Fold an example seen during training into the pipeline's statistics.
    fn learn(&mut self, example: Example<'_>);

    /// Featurize an example using the current statistics.
    fn transform(&self, example: Example<'_>) -> Features;

    /// Learn from an example, then featurize it.
    fn learn_transform(&mut self, example: Example<'_>) -> Features {
        self.learn(example);
        self.transform(example)
    }
}
