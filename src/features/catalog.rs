//! Catalog-aware pipeline: online TF-IDF plus category one-hot.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::text::{normalize, word_tokens};
use super::{Example, FeaturePipeline, Features};

/// Prefix of the one-hot category feature. Word tokens never contain `=`.
const CATEGORY_PREFIX: &str = "category=";

/// Online TF-IDF over description words, joined with a one-hot category.
///
/// Document frequencies grow with every learned example; the learner that
/// consumes the features owns the rest of the feature space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPipeline {
    documents: u64,
    document_frequencies: BTreeMap<String, u64>,
}

impl CatalogPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of descriptions learned so far.
    pub fn documents(&self) -> u64 {
        self.documents
    }

    /// Number of learned descriptions containing `word` (already normalized).
    pub fn document_frequency(&self, word: &str) -> u64 {
        self.document_frequencies.get(word).copied().unwrap_or(0)
    }

    /// Smoothed inverse document frequency.
    fn idf(&self, word: &str) -> f64 {
        let n = self.documents as f64;
        let df = self.document_frequency(word) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    }
}

impl FeaturePipeline for CatalogPipeline {
    fn learn(&mut self, example: Example<'_>) {
        let unique: BTreeSet<String> = word_tokens(example.description).into_iter().collect();
        for word in unique {
            *self.document_frequencies.entry(word).or_insert(0) += 1;
        }
        self.documents += 1;
    }

    fn transform(&self, example: Example<'_>) -> Features {
        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        let tokens = word_tokens(example.description);
        for token in &tokens {
            *counts.entry(token.clone()).or_insert(0.0) += 1.0;
        }

        let total = tokens.len() as f64;
        let mut features: Features = counts
            .into_iter()
            .map(|(word, count)| {
                let weight = (count / total) * self.idf(&word);
                (word, weight)
            })
            .collect();

        let norm = features.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in features.values_mut() {
                *weight /= norm;
            }
        }

        let category = normalize(example.category.trim());
        if !category.is_empty() {
            features.insert(format!("{CATEGORY_PREFIX}{category}"), 1.0);
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_is_l2_normalized() {
        let mut pipeline = CatalogPipeline::new();
        pipeline.learn(Example::description("uber trip"));
        pipeline.learn(Example::description("uber eats"));

        let features = pipeline.transform(Example::description("uber eats"));
        let norm: f64 = features.values().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        // "eats" is rarer than "uber", so it weighs more.
        assert!(features["eats"] > features["uber"]);
    }

    #[test]
    fn category_is_one_hot() {
        let pipeline = CatalogPipeline::new();
        let features = pipeline.transform(Example::new("Walmart", "Alimentação"));
        assert_eq!(features["category=alimentacao"], 1.0);
        assert!(features.contains_key("walmart"));
    }

    #[test]
    fn empty_category_adds_no_feature() {
        let pipeline = CatalogPipeline::new();
        let features = pipeline.transform(Example::new("Walmart", "  "));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn transform_does_not_mutate() {
        let mut pipeline = CatalogPipeline::new();
        pipeline.learn(Example::description("padaria"));
        let before = pipeline.clone();
        let _ = pipeline.transform(Example::description("farmacia"));
        assert_eq!(pipeline, before);
        assert_eq!(pipeline.documents(), 1);
        assert_eq!(pipeline.document_frequency("padaria"), 1);
    }
}
