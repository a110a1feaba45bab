//! Integration tests for [`SubcategoryClassifier`] — bootstrap training,
//! prediction, and weighted feedback replay against an in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use muninn::{
    DataSource, MemoryModelStore, ModelKey, ModelSlot, MuninnError, Resource, SubcategoryClassifier,
    SubcategoryFeedback, SubcategoryPrediction, TaskClassifier, TaskKind, TextInput,
    TrainingConfig, TransactionInput,
};

// =============================================================================
// Mock data source
// =============================================================================

const TOKEN: &str = "valid-token";

/// Serves canned records to callers presenting [`TOKEN`].
#[derive(Default)]
struct MockSource {
    records: HashMap<Resource, Vec<Value>>,
}

impl MockSource {
    fn with(mut self, resource: Resource, records: Value) -> Self {
        let records = records.as_array().cloned().unwrap_or_default();
        self.records.insert(resource, records);
        self
    }
}

#[async_trait]
impl DataSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, resource: Resource, credential: &str) -> Option<Vec<Value>> {
        if credential != TOKEN {
            return None;
        }
        self.records.get(&resource).cloned()
    }
}

fn walmart_source() -> MockSource {
    MockSource::default()
        .with(
            Resource::Categories,
            json!([{"id": 1, "description": "Food"}]),
        )
        .with(
            Resource::Subcategories,
            json!([{"id": 10, "description": "Groceries", "category": 1}]),
        )
        .with(
            Resource::Transactions,
            json!([{"description": "Walmart", "category": 1, "subcategory": 10}]),
        )
}

fn two_category_source() -> MockSource {
    MockSource::default()
        .with(
            Resource::Categories,
            json!([
                {"id": 1, "description": "Food"},
                {"id": 2, "description": "Transport"}
            ]),
        )
        .with(
            Resource::Subcategories,
            json!([
                {"id": 10, "description": "Groceries", "category": 1},
                {"id": 20, "description": "Rideshare", "category": 2}
            ]),
        )
        .with(
            Resource::Transactions,
            json!([
                {"description": "Walmart", "category": 1, "subcategory": 10},
                {"description": "Uber Eats", "category": 1, "subcategory": 10},
                {"description": "Uber Eats dinner", "category": 1, "subcategory": 10}
            ]),
        )
}

fn classifier(store: Arc<MemoryModelStore>, source: MockSource) -> SubcategoryClassifier {
    let key = ModelKey::new("42", TaskKind::Subcategory).unwrap();
    SubcategoryClassifier::new(
        ModelSlot::new(store, key),
        Arc::new(source),
        TrainingConfig::default(),
    )
}

fn correction(
    id: i64,
    description: &str,
    predicted: i64,
    category: i64,
    sub: i64,
) -> SubcategoryFeedback {
    SubcategoryFeedback {
        id: Some(id),
        description: Some(TextInput::from(description)),
        predicted_subcategory_id: Some(predicted),
        corrected_category_id: Some(category),
        corrected_subcategory_id: Some(sub),
    }
}

// =============================================================================
// Training
// =============================================================================

#[tokio::test]
async fn train_then_predict_known_transaction() {
    let store = Arc::new(MemoryModelStore::new());
    let classifier = classifier(store.clone(), walmart_source());

    let outcome = classifier.train(TOKEN).await.unwrap();
    assert!(outcome.success);
    assert!(outcome.message.contains("1 subcategories"));
    assert!(outcome.message.contains("1 transactions"));
    assert_eq!(outcome.samples, Some(2));
    assert!(classifier.is_trained().unwrap());

    let prediction = classifier.predict("Walmart", "").unwrap();
    assert_eq!(
        prediction,
        SubcategoryPrediction {
            category_id: Some(1),
            subcategory_id: Some(10),
        }
    );
}

#[tokio::test]
async fn train_with_invalid_token_mentions_token() {
    let store = Arc::new(MemoryModelStore::new());
    let classifier = classifier(store.clone(), walmart_source());

    let err = classifier.train("expired").await.unwrap_err();
    assert!(matches!(err, MuninnError::Unavailable(_)));
    assert!(err.to_string().contains("categories"));
    assert!(err.to_string().contains("token"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn train_fails_on_empty_transactions() {
    let store = Arc::new(MemoryModelStore::new());
    let source = walmart_source().with(Resource::Transactions, json!([]));
    let classifier = classifier(store.clone(), source);

    let err = classifier.train(TOKEN).await.unwrap_err();
    assert!(err.to_string().contains("transactions"));
    assert!(!classifier.is_trained().unwrap());
}

#[tokio::test]
async fn malformed_upstream_records_are_skipped() {
    let store = Arc::new(MemoryModelStore::new());
    let source = walmart_source().with(
        Resource::Transactions,
        json!([
            {"description": "Walmart", "category": 1, "subcategory": 10},
            {"description": "no subcategory", "category": 1}
        ]),
    );
    let classifier = classifier(store, source);

    let outcome = classifier.train(TOKEN).await.unwrap();
    assert!(outcome.message.contains("1 transactions"));
}

#[tokio::test]
async fn retraining_replaces_previous_model() {
    let store = Arc::new(MemoryModelStore::new());
    classifier(store.clone(), two_category_source())
        .train(TOKEN)
        .await
        .unwrap();

    let classifier = classifier(store.clone(), walmart_source());
    classifier.train(TOKEN).await.unwrap();

    let model = classifier.load_model().unwrap();
    assert!(!model.subcategory_map().contains_key(&20));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Prediction
// =============================================================================

#[tokio::test]
async fn untrained_predict_is_empty() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), walmart_source());
    let prediction = classifier.predict("anything", "Food").unwrap();
    assert!(prediction.is_empty());
    assert!(!classifier.is_trained().unwrap());
}

#[tokio::test]
async fn predict_batch_matches_single_predictions() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    classifier.train(TOKEN).await.unwrap();

    let inputs = vec![
        TransactionInput::new("Walmart").with_category("Food"),
        TransactionInput::new(json!({"description": "Rideshare"})),
        TransactionInput::new(Value::Null),
    ];
    let batch = classifier.predict_batch(&inputs).unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0], classifier.predict("Walmart", "Food").unwrap());
    assert_eq!(batch[1], classifier.predict("Rideshare", "").unwrap());
    assert_eq!(batch[2], classifier.predict("", "").unwrap());
}

#[tokio::test]
async fn repeated_predictions_are_identical() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    classifier.train(TOKEN).await.unwrap();

    let first = classifier.predict("Uber ride", "").unwrap();
    for _ in 0..5 {
        assert_eq!(classifier.predict("Uber ride", "").unwrap(), first);
    }
}

#[tokio::test]
async fn exact_tie_predicts_smallest_subcategory_id() {
    let source = MockSource::default()
        .with(
            Resource::Categories,
            json!([{"id": 1, "description": "Transfers"}]),
        )
        .with(
            Resource::Subcategories,
            json!([
                {"id": 20, "description": "Pix transfer", "category": 1},
                {"id": 10, "description": "Pix transfer", "category": 1}
            ]),
        )
        .with(
            Resource::Transactions,
            json!([
                {"description": "Pix transfer", "category": 1, "subcategory": 20},
                {"description": "Pix transfer", "category": 1, "subcategory": 10}
            ]),
        );
    let classifier = classifier(Arc::new(MemoryModelStore::new()), source);
    classifier.train(TOKEN).await.unwrap();

    let prediction = classifier.predict("Pix transfer", "Transfers").unwrap();
    assert_eq!(prediction.subcategory_id, Some(10));
}

// =============================================================================
// Feedback
// =============================================================================

#[tokio::test]
async fn weighted_feedback_flips_prediction() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    classifier.train(TOKEN).await.unwrap();
    assert_eq!(classifier.predict("Uber", "").unwrap().subcategory_id, Some(10));

    let outcome = classifier
        .retrain_from_feedback(&[correction(7, "Uber", 10, 2, 20)], TOKEN)
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.corrections, Some(1));
    assert_eq!(outcome.feedback_ids, vec![7]);

    let prediction = classifier.predict("Uber", "").unwrap();
    assert_eq!(prediction.subcategory_id, Some(20));
    assert_eq!(prediction.category_id, Some(2));
}

#[tokio::test]
async fn correction_weight_is_configurable() {
    let store = Arc::new(MemoryModelStore::new());
    let key = ModelKey::new("42", TaskKind::Subcategory).unwrap();
    let classifier = SubcategoryClassifier::new(
        ModelSlot::new(store, key),
        Arc::new(two_category_source()),
        TrainingConfig::new().correction_weight(3),
    );
    classifier.train(TOKEN).await.unwrap();
    let before = classifier.load_model().unwrap().learner().class_count(&20);

    classifier
        .retrain_from_feedback(&[correction(1, "Uber", 10, 2, 20)], TOKEN)
        .await
        .unwrap();
    let after = classifier.load_model().unwrap().learner().class_count(&20);
    assert_eq!(after - before, 3.0);
}

#[tokio::test]
async fn confirmations_and_incomplete_feedback_are_not_replayed() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    classifier.train(TOKEN).await.unwrap();
    let before = classifier.load_model().unwrap();

    let incomplete = SubcategoryFeedback {
        id: Some(3),
        description: Some(TextInput::from("Uber")),
        corrected_subcategory_id: Some(20),
        ..Default::default()
    };
    let outcome = classifier
        .retrain_from_feedback(&[correction(2, "Walmart", 10, 1, 10), incomplete], TOKEN)
        .await
        .unwrap();

    assert_eq!(outcome.corrections, Some(0));
    assert_eq!(outcome.feedback_ids, vec![2]);
    assert_eq!(classifier.load_model().unwrap().learner(), before.learner());
}

#[tokio::test]
async fn corrected_subcategory_outside_map_has_no_category() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    classifier.train(TOKEN).await.unwrap();

    classifier
        .retrain_from_feedback(&[correction(9, "Netflix", 10, 2, 99)], TOKEN)
        .await
        .unwrap();

    let prediction = classifier.predict("Netflix", "").unwrap();
    assert_eq!(prediction.subcategory_id, Some(99));
    assert_eq!(prediction.category_id, None);
}

#[tokio::test]
async fn feedback_requires_categories() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    let err = classifier
        .retrain_from_feedback(&[correction(1, "Uber", 10, 2, 20)], "expired")
        .await
        .unwrap_err();
    assert!(matches!(err, MuninnError::Unavailable(_)));
}

#[tokio::test]
async fn feedback_on_untrained_model_starts_from_empty() {
    let classifier = classifier(Arc::new(MemoryModelStore::new()), two_category_source());
    classifier
        .retrain_from_feedback(&[correction(1, "Uber", 10, 2, 20)], TOKEN)
        .await
        .unwrap();

    assert!(classifier.is_trained().unwrap());
    let prediction = classifier.predict("Uber", "Transport").unwrap();
    assert_eq!(prediction.subcategory_id, Some(20));
    // The map is only rebuilt by full training.
    assert_eq!(prediction.category_id, None);
}
