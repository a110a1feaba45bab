//! Multinomial naive Bayes with Laplace smoothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::OnlineLearner;
use crate::features::Features;

/// Default additive smoothing.
const DEFAULT_ALPHA: f64 = 1.0;

/// Multinomial naive Bayes over non-negative sparse features.
///
/// Counts are kept as `f64` so that fractional (TF-IDF) features and weighted
/// updates accumulate exactly like repeated unit updates would. All state is
/// in ordered maps; ties between equally likely labels resolve to the
/// smallest label, whatever order the labels were learned in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "L: Serialize",
    deserialize = "L: Deserialize<'de> + Ord"
))]
pub struct MultinomialNb<L> {
    alpha: f64,
    /// Total example weight per label.
    class_counts: BTreeMap<L, f64>,
    /// feature → label → accumulated feature mass.
    feature_counts: BTreeMap<String, BTreeMap<L, f64>>,
    /// Accumulated feature mass per label.
    class_totals: BTreeMap<L, f64>,
}

impl<L: Ord> Default for MultinomialNb<L> {
    fn default() -> Self {
        Self::with_alpha(DEFAULT_ALPHA)
    }
}

impl<L: Ord + Clone> MultinomialNb<L> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: Ord> MultinomialNb<L> {
    /// Create a learner with custom additive smoothing.
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            class_counts: BTreeMap::new(),
            feature_counts: BTreeMap::new(),
            class_totals: BTreeMap::new(),
        }
    }

    /// Whether no example has been learned.
    pub fn is_empty(&self) -> bool {
        self.class_counts.is_empty()
    }

    /// Labels seen so far, in order.
    pub fn classes(&self) -> impl Iterator<Item = &L> {
        self.class_counts.keys()
    }

    /// Total example weight learned for `label`.
    pub fn class_count(&self, label: &L) -> f64 {
        self.class_counts.get(label).copied().unwrap_or(0.0)
    }

    /// Number of distinct features seen.
    pub fn n_features(&self) -> usize {
        self.feature_counts.len()
    }

    fn update(&mut self, features: &Features, label: &L, weight: f64)
    where
        L: Clone,
    {
        *self.class_counts.entry(label.clone()).or_insert(0.0) += weight;
        let mut mass = 0.0;
        for (name, value) in features {
            let contribution = value * weight;
            *self
                .feature_counts
                .entry(name.clone())
                .or_default()
                .entry(label.clone())
                .or_insert(0.0) += contribution;
            mass += contribution;
        }
        *self.class_totals.entry(label.clone()).or_insert(0.0) += mass;
    }

    /// Joint log-likelihood of `features` under each label.
    fn joint_log_likelihood(&self, features: &Features) -> Vec<(&L, f64)> {
        let total: f64 = self.class_counts.values().sum();
        let vocabulary = self.n_features().max(1) as f64;

        self.class_counts
            .iter()
            .map(|(label, count)| {
                let class_total = self.class_totals.get(label).copied().unwrap_or(0.0);
                let denominator = class_total + self.alpha * vocabulary;
                let likelihood: f64 = features
                    .iter()
                    .map(|(name, value)| {
                        let numerator = self
                            .feature_counts
                            .get(name)
                            .and_then(|per_label| per_label.get(label))
                            .copied()
                            .unwrap_or(0.0)
                            + self.alpha;
                        value * (numerator / denominator).ln()
                    })
                    .sum();
                (label, (count / total).ln() + likelihood)
            })
            .collect()
    }
}

impl<L: Ord + Clone> OnlineLearner for MultinomialNb<L> {
    type Label = L;

    fn learn_one(&mut self, features: &Features, label: &L) {
        self.update(features, label, 1.0);
    }

    fn learn_repeated(&mut self, features: &Features, label: &L, times: u32) {
        if times > 0 {
            self.update(features, label, f64::from(times));
        }
    }

    /// Labels are scanned in ascending order and only a strictly higher
    /// score replaces the leader, so an exact tie keeps the smallest label.
    fn predict_one(&self, features: &Features) -> Option<L> {
        let mut best: Option<(&L, f64)> = None;
        for (label, score) in self.joint_log_likelihood(features) {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label.clone())
    }

    fn predict_proba_one(&self, features: &Features) -> Option<BTreeMap<L, f64>> {
        let scores = self.joint_log_likelihood(features);
        let max = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<(&L, f64)> = scores
            .into_iter()
            .map(|(label, s)| (label, (s - max).exp()))
            .collect();
        let sum: f64 = exps.iter().map(|(_, e)| e).sum();
        Some(
            exps.into_iter()
                .map(|(label, e)| (label.clone(), e / sum))
                .collect(),
        )
    }
}
