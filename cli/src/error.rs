//! Error types for bsql
//!
//! Provides user-facing error messages for failures outside the batch
//! stream itself. Per-batch problems (submission errors, row fetch errors)
//! are reported by the execution loop and never surface here.

use bsql_link::LinkError;
use std::fmt;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CLIError>;

/// Errors that can occur in the CLI
#[derive(Debug)]
pub enum CLIError {
    /// Error from the session client
    LinkError(LinkError),

    /// Invalid configuration (flags, config file, terminator pattern)
    ConfigurationError(String),

    /// Input or output file could not be opened
    FileError(String),

    /// Writing to the output sink failed
    OutputError(String),

    /// Line editor could not be initialized
    ReadlineError(String),

    /// History file error
    HistoryError(String),

    /// Moving to the next result set failed; no further batches are run
    ResultSetError(String),
}

impl CLIError {
    fn format_link_error(err: &LinkError) -> String {
        match err {
            LinkError::NetworkError(msg) => Self::clean_nested_message(msg),
            LinkError::ServerError {
                status_code,
                message,
                ..
            } => format!("Server error ({}): {}", status_code, message),
            other => other.to_string(),
        }
    }

    fn clean_nested_message(message: &str) -> String {
        let mut cleaned = message.trim();
        let prefixes = ["error sending request for url", "Network error:"];

        for prefix in &prefixes {
            if let Some(rest) = cleaned.strip_prefix(prefix) {
                cleaned = rest.trim_start();
            }
        }

        cleaned.to_string()
    }
}

impl fmt::Display for CLIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLIError::LinkError(e) => write!(f, "{}", Self::format_link_error(e)),
            CLIError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CLIError::FileError(msg) => write!(f, "File error: {}", msg),
            CLIError::OutputError(msg) => write!(f, "Output error: {}", msg),
            CLIError::ReadlineError(msg) => write!(f, "Input error: {}", msg),
            CLIError::HistoryError(msg) => write!(f, "History error: {}", msg),
            CLIError::ResultSetError(msg) => write!(f, "Result set error: {}", msg),
        }
    }
}

impl std::error::Error for CLIError {}

impl From<LinkError> for CLIError {
    fn from(err: LinkError) -> Self {
        CLIError::LinkError(err)
    }
}

impl From<rustyline::error::ReadlineError> for CLIError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CLIError::ReadlineError(err.to_string())
    }
}

impl From<std::io::Error> for CLIError {
    fn from(err: std::io::Error) -> Self {
        CLIError::FileError(err.to_string())
    }
}

impl From<toml::de::Error> for CLIError {
    fn from(err: toml::de::Error) -> Self {
        CLIError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

impl From<regex::Error> for CLIError {
    fn from(err: regex::Error) -> Self {
        CLIError::ConfigurationError(format!("invalid terminator pattern: {}", err))
    }
}
