use serde::{Deserialize, Serialize};

/// Error details for failed SQL execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error code, numeric for engine errors (e.g. "208")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Severity level reported by the engine (defaults to 16 when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDetail {
    pub fn severity_or_default(&self) -> u8 {
        self.severity.unwrap_or(16)
    }

    /// Numeric form of `code`, 0 when the code is symbolic
    pub fn number(&self) -> i32 {
        self.code.trim().parse().unwrap_or(0)
    }
}
