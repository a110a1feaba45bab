//! Tests for metrics emission.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::{Value, json};

use muninn::{
    DataSource, DescriptionClassifier, DescriptionFeedback, MemoryModelStore, ModelKey, ModelSlot,
    Resource, SubcategoryClassifier, TaskClassifier, TaskKind, TrainingConfig, telemetry,
};

// ============================================================================
// Mock sources
// ============================================================================

struct CatalogSource;

#[async_trait]
impl DataSource for CatalogSource {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch(&self, resource: Resource, _credential: &str) -> Option<Vec<Value>> {
        let records = match resource {
            Resource::Categories => json!([{"id": 1, "description": "Food"}]),
            Resource::Subcategories => {
                json!([{"id": 10, "description": "Groceries", "category": 1}])
            }
            Resource::Transactions => json!([
                {"description": "Walmart", "category": 1, "subcategory": 10},
                {"description": "broken"}
            ]),
            Resource::CategorizationFeedback => return None,
        };
        records.as_array().cloned()
    }
}

struct EmptySource;

#[async_trait]
impl DataSource for EmptySource {
    fn name(&self) -> &str {
        "empty"
    }

    async fn fetch(&self, _resource: Resource, _credential: &str) -> Option<Vec<Value>> {
        None
    }
}

fn subcategory(source: impl DataSource + 'static) -> SubcategoryClassifier {
    let key = ModelKey::new("42", TaskKind::Subcategory).unwrap();
    SubcategoryClassifier::new(
        ModelSlot::new(Arc::new(MemoryModelStore::new()), key),
        Arc::new(source),
        TrainingConfig::default(),
    )
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for `name` carrying label `label=value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn successful_training_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let classifier = subcategory(CatalogSource);
                classifier.train("t").await?;
                classifier.predict("Walmart", "")
            })
        })
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::TRAININGS_TOTAL, "status", "ok"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::TRAINING_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::PREDICTIONS_TOTAL, "outcome", "predicted"),
        1
    );
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::SKIPPED_RECORDS_TOTAL,
            "resource",
            "transactions"
        ),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn failed_training_records_error_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(async { subcategory(EmptySource).train("t").await })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::TRAININGS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::TRAININGS_TOTAL, "status", "error"),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn description_feedback_records_corrections() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let key = ModelKey::new("42", TaskKind::Description).unwrap();
                let classifier = DescriptionClassifier::new(
                    ModelSlot::new(Arc::new(MemoryModelStore::new()), key),
                    Arc::new(EmptySource),
                    TrainingConfig::default(),
                );
                let feedbacks = vec![
                    DescriptionFeedback::new("pagto", "pagamento"),
                    DescriptionFeedback::new("transf", "transferencia"),
                    DescriptionFeedback::default(),
                ];
                classifier.retrain_from_feedback(&feedbacks, "t").await?;
                classifier.predict("unknown", "")
            })
        })
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::FEEDBACK_CORRECTIONS_TOTAL),
        2
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::SKIPPED_RECORDS_TOTAL, "task", "description"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::TRAININGS_TOTAL, "kind", "feedback"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::PREDICTIONS_TOTAL, "outcome", "unseen"),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let classifier = subcategory(CatalogSource);
    classifier.train("t").await.unwrap();
    classifier.predict("Walmart", "").unwrap();
}
