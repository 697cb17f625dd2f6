//! Error types for bsql-link

use thiserror::Error;

use crate::models::ErrorDetail;

/// Errors that can occur while talking to the SQL endpoint
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Non-2xx response. `detail` is present when the body carried a
    /// structured error.
    #[error("Server error ({status_code}): {message}")]
    ServerError {
        status_code: u16,
        message: String,
        detail: Option<ErrorDetail>,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// `reqwest` keeps the interesting part (refused, DNS, TLS) in the source
/// chain; its own `Display` only names the URL.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl From<reqwest::Error> for LinkError {
    fn from(err: reqwest::Error) -> Self {
        let message = describe(&err);
        if err.is_timeout() {
            LinkError::TimeoutError(message)
        } else if err.is_decode() {
            LinkError::SerializationError(message)
        } else if err.is_builder() {
            LinkError::ConfigurationError(message)
        } else {
            LinkError::NetworkError(message)
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::SerializationError(err.to_string())
    }
}
