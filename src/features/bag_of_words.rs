//! Manual bag-of-words pipeline with a global vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::text::whitespace_tokens;
use super::{Example, FeaturePipeline, Features};

/// Global word occurrence counts across everything learned.
///
/// Grows monotonically; nothing is ever pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    counts: BTreeMap<String, u64>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every occurrence of every token.
    pub fn absorb<S: AsRef<str>>(&mut self, tokens: &[S]) {
        for token in tokens {
            *self.counts.entry(token.as_ref().to_string()).or_insert(0) += 1;
        }
    }

    /// How many times `token` has been absorbed.
    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Whether at least one of `tokens` is known.
    pub fn overlaps<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.iter().any(|t| self.counts.contains_key(t.as_ref()))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Whitespace bag-of-words over normalized descriptions.
///
/// The category hint is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BagOfWords {
    vocabulary: Vocabulary,
}

impl BagOfWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Whether `description` shares no token with the vocabulary.
    pub fn is_unseen(&self, description: &str) -> bool {
        !self.vocabulary.overlaps(&whitespace_tokens(description))
    }
}

impl FeaturePipeline for BagOfWords {
    fn learn(&mut self, example: Example<'_>) {
        self.vocabulary
            .absorb(&whitespace_tokens(example.description));
    }

    fn transform(&self, example: Example<'_>) -> Features {
        let mut features = Features::new();
        for token in whitespace_tokens(example.description) {
            *features.entry(token).or_insert(0.0) += 1.0;
        }
        features
    }
}
