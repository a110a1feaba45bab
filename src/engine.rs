//! Builder and entry point wiring stores, sources and controllers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::classifier::{DescriptionClassifier, SubcategoryClassifier};
use crate::config::{Config, TrainingConfig};
use crate::source::{DEFAULT_TIMEOUT_SECS, DataSource, HttpDataSource};
use crate::status::StatusAggregator;
use crate::store::{FileModelStore, ModelKey, ModelSlot, ModelStore};
use crate::types::{TaskKind, TaskStatus};
use crate::{MuninnError, Result};

/// Main entry point for creating engine instances.
pub struct Muninn;

impl Muninn {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }
}

/// Builder for configuring engine instances.
pub struct MuninnBuilder {
    model_dir: Option<PathBuf>,
    store: Option<Arc<dyn ModelStore>>,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    source: Option<Arc<dyn DataSource>>,
    training: TrainingConfig,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            model_dir: None,
            store: None,
            api_url: None,
            timeout_secs: None,
            source: None,
            training: TrainingConfig::default(),
        }
    }

    /// Seed the builder from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new()
            .timeout(config.source.timeout_secs)
            .training(config.training.clone());
        if let Some(dir) = &config.store.model_dir {
            builder = builder.model_dir(dir.clone());
        }
        if let Some(url) = config.api_url() {
            builder = builder.api_url(url);
        }
        builder
    }

    /// Store artifacts as files under `dir`.
    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(dir.into());
        self
    }

    /// Use a custom model store. Takes precedence over [`model_dir`](Self::model_dir).
    pub fn store(mut self, store: Arc<dyn ModelStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Fetch upstream data over HTTP from `url`.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the upstream request timeout (seconds).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Use a custom data source. Takes precedence over [`api_url`](Self::api_url).
    pub fn source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    /// Build the engine.
    ///
    /// Fails when neither a data source nor an API URL was configured.
    pub fn build(self) -> Result<Engine> {
        let source: Arc<dyn DataSource> = match (self.source, self.api_url) {
            (Some(source), _) => source,
            (None, Some(url)) => {
                let timeout = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
                Arc::new(HttpDataSource::with_timeout(
                    url,
                    Duration::from_secs(timeout),
                )?)
            }
            (None, None) => {
                return Err(MuninnError::Configuration(
                    "no data source configured; set source.base_url or MUNINN_API_URL"
                        .to_string(),
                ));
            }
        };

        let store: Arc<dyn ModelStore> = match (self.store, self.model_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileModelStore::new(dir)),
            (None, None) => Arc::new(FileModelStore::default()),
        };

        debug!(source = source.name(), "built muninn engine");
        Ok(Engine {
            store,
            source,
            training: self.training,
        })
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out per-user task controllers sharing one store and data source.
///
/// Controllers are cheap to create and hold no model state; create one per
/// request.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn ModelStore>,
    source: Arc<dyn DataSource>,
    training: TrainingConfig,
}

impl Engine {
    /// Subcategory controller for `user_id`.
    pub fn subcategory(&self, user_id: &str) -> Result<SubcategoryClassifier> {
        Ok(SubcategoryClassifier::new(
            self.slot(user_id, TaskKind::Subcategory)?,
            self.source.clone(),
            self.training.clone(),
        ))
    }

    /// Description-correction controller for `user_id`.
    pub fn description(&self, user_id: &str) -> Result<DescriptionClassifier> {
        Ok(DescriptionClassifier::new(
            self.slot(user_id, TaskKind::Description)?,
            self.source.clone(),
            self.training.clone(),
        ))
    }

    /// Training status of every task for `user_id`.
    pub fn status(&self, user_id: &str) -> Result<Vec<TaskStatus>> {
        StatusAggregator::new(self.store.clone()).status(user_id)
    }

    pub fn store(&self) -> &Arc<dyn ModelStore> {
        &self.store
    }

    pub fn training(&self) -> &TrainingConfig {
        &self.training
    }

    fn slot(&self, user_id: &str, task: TaskKind) -> Result<ModelSlot> {
        Ok(ModelSlot::new(
            self.store.clone(),
            ModelKey::new(user_id, task)?,
        ))
    }
}
