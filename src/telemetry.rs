//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `task` — labeling task: "subcategory" or "description"
//! - `status` — outcome: "ok" or "error"
//! - `resource` — upstream resource (e.g. "transactions")

/// Total training runs (bootstrap and feedback).
///
/// Labels: `task`, `kind` ("train" | "feedback"), `status` ("ok" | "error").
pub const TRAININGS_TOTAL: &str = "muninn_trainings_total";

/// Training duration in seconds, including upstream fetches.
///
/// Labels: `task`, `kind`.
pub const TRAINING_DURATION_SECONDS: &str = "muninn_training_duration_seconds";

/// Total predictions served.
///
/// Labels: `task`, `outcome` (e.g. "predicted", "empty", "unseen").
pub const PREDICTIONS_TOTAL: &str = "muninn_predictions_total";

/// Total corrections replayed into a learner from feedback.
///
/// Labels: `task`.
pub const FEEDBACK_CORRECTIONS_TOTAL: &str = "muninn_feedback_corrections_total";

/// Total upstream or feedback records skipped as malformed.
///
/// Labels: `resource` (feedback records also carry `task`).
pub const SKIPPED_RECORDS_TOTAL: &str = "muninn_skipped_records_total";

/// Total upstream fetches.
///
/// Labels: `resource`, `status`.
pub const FETCHES_TOTAL: &str = "muninn_fetches_total";
