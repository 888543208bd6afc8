//! Error types for model calls
//!
//! Every variant ends up as a message on screen; the variants exist so the
//! message says what went wrong, not so callers can branch on them.

use std::time::Duration;
use thiserror::Error;

/// Error type for completion requests
#[derive(Debug, Error)]
pub enum LLMError {
    /// API key is missing or was rejected
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    /// Request could not be sent or the connection dropped
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// API returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Request timed out (only when a timeout is configured)
    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Response body could not be decoded
    #[error("Parsing error: {message}")]
    ParseError { message: String },

    /// Response had no text content
    #[error("The model returned no text")]
    EmptyResponse,

    /// Client could not be set up
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl LLMError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthenticationError { message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError { status, message: message.into() }
    }

    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }
}

/// Result type for model calls
pub type LLMResult<T> = Result<T, LLMError>;

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError { message: err.to_string() }
    }
}
