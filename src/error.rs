//! Muninn error types

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Upstream data errors
    /// A resource required for training was missing or empty upstream.
    ///
    /// The message names the resource; an invalid bearer token is the most
    /// common cause.
    #[error("data unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Persistence errors
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted artifact could not be decoded, has an unsupported format
    /// version, or belongs to a different task.
    #[error("artifact error: {0}")]
    Artifact(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MuninnError {
    /// Build the error raised when `resource` could not be fetched for training.
    pub fn unavailable(resource: &str) -> Self {
        MuninnError::Unavailable(format!(
            "could not fetch {resource} to train the model; check that the token is valid"
        ))
    }
}

/// Result type alias for Muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
