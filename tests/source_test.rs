//! Integration tests for [`HttpDataSource`] via wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use muninn::source::fetch_records;
use muninn::{Category, DataSource, HttpDataSource, Resource};

#[tokio::test]
async fn fetch_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "description": "Food"},
            {"id": 2, "description": "Transport"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpDataSource::new(format!("{}/api/", server.uri())).unwrap();
    let records = source.fetch(Resource::Categories, "secret").await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn feedback_resource_uses_hyphenated_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorization-feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let source = HttpDataSource::new(server.uri()).unwrap();
    let records = source
        .fetch(Resource::CategorizationFeedback, "t")
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn error_status_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let source = HttpDataSource::new(server.uri()).unwrap();
    assert!(source.fetch(Resource::Transactions, "bad").await.is_none());
}

#[tokio::test]
async fn non_array_body_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subcategories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "oops"})))
        .mount(&server)
        .await;

    let source = HttpDataSource::new(server.uri()).unwrap();
    assert!(source.fetch(Resource::Subcategories, "t").await.is_none());
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let source =
        HttpDataSource::with_timeout(server.uri(), Duration::from_millis(100)).unwrap();
    assert!(source.fetch(Resource::Categories, "t").await.is_none());
}

#[tokio::test]
async fn fetch_records_skips_malformed_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "description": "Food"},
            {"id": "not-a-number", "description": "Broken"},
            {"description": "missing id"}
        ])))
        .mount(&server)
        .await;

    let source = HttpDataSource::new(server.uri()).unwrap();
    let categories: Vec<Category> = fetch_records(&source, Resource::Categories, "t")
        .await
        .unwrap();
    assert_eq!(
        categories,
        vec![Category {
            id: 1,
            description: "Food".to_string(),
        }]
    );
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let source = HttpDataSource::new("http://localhost:8000/api/").unwrap();
    assert_eq!(source.base_url(), "http://localhost:8000/api");
}
