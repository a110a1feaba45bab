//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. `--config <path>`)
//! 2. `~/.muninn/config.toml` (user)
//! 3. `/etc/muninn/config.toml` (system)
//!
//! Every field has a default, so an absent file is not an error for
//! [`Config::load_or_default`]. The `MUNINN_API_URL` environment variable
//! overrides `source.base_url`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::source::DEFAULT_TIMEOUT_SECS;
use crate::{MuninnError, Result};

/// Environment variable overriding the upstream API base URL.
pub const API_URL_ENV: &str = "MUNINN_API_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Where model artifacts live.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Artifact directory (default: `<data dir>/muninn/models`).
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
}

/// Upstream data source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the upstream REST API.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 5).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Learning policy knobs.
///
/// ```rust
/// # use muninn::TrainingConfig;
/// let config = TrainingConfig::new().correction_weight(10).min_confidence(0.5);
/// assert_eq!(config.correction_weight, 10);
/// assert_eq!(config.min_samples, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingConfig {
    /// Times each subcategory correction is replayed (default: 50).
    #[serde(default = "default_correction_weight")]
    pub correction_weight: u32,
    /// Usable description samples below which training warns (default: 5).
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Probability below which a description correction is withheld (default: 0.3).
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            correction_weight: default_correction_weight(),
            min_samples: default_min_samples(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_correction_weight() -> u32 {
    50
}

fn default_min_samples() -> usize {
    5
}

fn default_min_confidence() -> f64 {
    0.3
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correction_weight(mut self, weight: u32) -> Self {
        self.correction_weight = weight;
        self
    }

    pub fn min_samples(mut self, samples: usize) -> Self {
        self.min_samples = samples;
        self
    }

    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence;
        self
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Fails if no file is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?.ok_or_else(|| {
            MuninnError::Configuration(
                "No config file found. Create ~/.muninn/config.toml or /etc/muninn/config.toml"
                    .to_string(),
            )
        })?;
        Self::load_from_file(&path)
    }

    /// Like [`load`](Self::load), but falls back to defaults when no file
    /// exists. An explicit path must still exist.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MuninnError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MuninnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MuninnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, or `None` if no standard file exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MuninnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".muninn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/muninn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Upstream base URL, preferring the environment override.
    pub fn api_url(&self) -> Option<String> {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.source.base_url.clone())
    }
}
