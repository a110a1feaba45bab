//! Upstream data source.
//!
//! The engine reads catalog, history and feedback records through a
//! [`DataSource`]. A fetch yields `None` when the resource is unavailable,
//! which is distinct from an empty list. Individual records that fail to
//! parse are skipped with a warning rather than failing the whole fetch.

mod http;

pub use http::{DEFAULT_TIMEOUT_SECS, HttpDataSource};

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::telemetry;

/// Resources the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Categories,
    Subcategories,
    Transactions,
    CategorizationFeedback,
}

impl Resource {
    /// Path segment of the resource on the upstream API.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Subcategories => "subcategories",
            Resource::Transactions => "transactions",
            Resource::CategorizationFeedback => "categorization-feedback",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Supplier of raw records for a user, authenticated by bearer credential.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch every record of `resource`, or `None` if it is unavailable.
    async fn fetch(&self, resource: Resource, credential: &str) -> Option<Vec<Value>>;
}

/// Parse raw records, skipping (and logging) those that don't fit `T`.
pub fn parse_records<T: DeserializeOwned>(resource: Resource, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(%resource, index, %id, error = %e, "skipping malformed record");
                    metrics::counter!(telemetry::SKIPPED_RECORDS_TOTAL,
                        "resource" => resource.path(),
                    )
                    .increment(1);
                    None
                }
            }
        })
        .collect()
}

/// Fetch and parse `resource`. `None` means unavailable upstream.
pub async fn fetch_records<T: DeserializeOwned>(
    source: &dyn DataSource,
    resource: Resource,
    credential: &str,
) -> Option<Vec<T>> {
    let raw = source.fetch(resource, credential).await?;
    Some(parse_records(resource, raw))
}
