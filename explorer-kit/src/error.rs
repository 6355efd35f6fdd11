//! Unified error types for explorer-kit.

use thiserror::Error;

use crate::chain::ProviderError;

/// Top-level error type for the explorer-kit library and CLI.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be resolved, read, or parsed.
    #[error("config: {0}")]
    Config(String),

    /// A wallet provider request failed and was not recovered.
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    /// A JSON document could not be encoded or decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// An outbound HTTP request failed.
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote response did not match the expected shape.
    #[error("invalid response schema for {resource}")]
    InvalidSchema {
        /// Name of the API resource whose response was rejected.
        resource: &'static str,
    },
}

impl Error {
    /// Configuration error from a plain message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Configuration error carrying the underlying cause in its message.
    pub fn config_with(context: impl std::fmt::Display, source: impl std::fmt::Display) -> Self {
        Self::Config(format!("{context}: {source}"))
    }
}
