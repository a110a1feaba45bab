//! HTTP data source for the upstream REST API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{DataSource, Resource};
use crate::telemetry;
use crate::{MuninnError, Result};

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Reads resources with `GET <base_url>/<resource>` and a bearer token.
///
/// Non-2xx responses, transport errors and bodies that aren't a JSON array
/// all yield `None`.
#[derive(Clone)]
pub struct HttpDataSource {
    http: Client,
    base_url: String,
}

impl HttpDataSource {
    /// Create a source with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MuninnError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }

    async fn get(&self, resource: Resource, credential: &str) -> Result<Vec<Value>> {
        let url = self.url(resource);
        let response = self
            .http
            .get(&url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MuninnError::Http(format!("{url} returned HTTP {status}")));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| MuninnError::Http(format!("invalid body from {url}: {e}")))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, resource: Resource, credential: &str) -> Option<Vec<Value>> {
        let start = Instant::now();
        let result = self.get(resource, credential).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::FETCHES_TOTAL,
            "resource" => resource.path(),
            "status" => status,
        )
        .increment(1);

        match result {
            Ok(records) => {
                debug!(
                    %resource,
                    count = records.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "fetched records"
                );
                Some(records)
            }
            Err(e) => {
                warn!(%resource, error = %e, "failed to fetch records");
                None
            }
        }
    }
}
