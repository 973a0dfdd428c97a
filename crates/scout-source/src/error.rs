//! Error types for posting-source operations.

use thiserror::Error;

/// Error type for posting-source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse source response: {0}")]
    ParseError(String),

    #[error("Source rate limit exceeded")]
    RateLimited,

    #[error("Invalid source configuration: {0}")]
    ConfigError(String),
}
