//! Error types for Support Triage.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Message source error: {0}")]
    Source(#[from] SourceError),

    #[error("Insights error: {0}")]
    Insights(#[from] InsightsError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors loading raw messages from disk.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read messages from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse messages from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate message id: {id}")]
    DuplicateId { id: String },
}

/// Insight client construction errors.
///
/// Request-time failures are not errors: they degrade to
/// `InsightsOutcome::Unavailable` with a reason code.
#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A rejected insights payload. Returned as a value, never wrapped in
/// [`Error`]; callers degrade to "insights unavailable".
///
/// Carries the first violated constraint, e.g. `insights[1].title too long`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
