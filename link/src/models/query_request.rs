use serde::{Deserialize, Serialize};

/// Request payload for SQL batch execution.
///
/// # Examples
///
/// ```rust
/// use bsql_link::QueryRequest;
///
/// let request = QueryRequest {
///     sql: "select name from sysobjects".to_string(),
///     database: Some("master".to_string()),
///     session_id: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Batch text, sent as-is
    pub sql: String,

    /// Database the batch runs in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Server-side session to reuse, so transactions span requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
