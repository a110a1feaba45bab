//! Online learners.
//!
//! An [`OnlineLearner`] is updated one example at a time and never re-scans
//! earlier examples. Given the same ordered sequence of updates it produces
//! the same predictions: no learner injects randomness.

mod naive_bayes;

pub use naive_bayes::MultinomialNb;

use std::collections::BTreeMap;

use crate::features::Features;

/// Incremental single-example classifier.
pub trait OnlineLearner {
    /// Target label type.
    type Label: Clone + Ord;

    /// Perform exactly one incremental update.
    fn learn_one(&mut self, features: &Features, label: &Self::Label);

    /// Apply the same example `times` times.
    ///
    /// Equivalent to `times` calls to [`learn_one`](Self::learn_one);
    /// learners whose updates are additive override this with a single
    /// weighted update.
    fn learn_repeated(&mut self, features: &Features, label: &Self::Label, times: u32) {
        for _ in 0..times {
            self.learn_one(features, label);
        }
    }

    /// Most probable label, or `None` when nothing has been learned yet.
    fn predict_one(&self, features: &Features) -> Option<Self::Label>;

    /// Per-label probability estimates.
    ///
    /// Returns `None` when the learner does not estimate probabilities;
    /// callers skip confidence gating in that case.
    fn predict_proba_one(&self, _features: &Features) -> Option<BTreeMap<Self::Label, f64>> {
        None
    }
}
