use serde::{Deserialize, Serialize};

use super::{ErrorDetail, QueryResult, ResponseStatus, ServerNotice};

/// Response for one submitted batch.
///
/// A batch can produce several result sets; they are listed in `results` in
/// the order the engine produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: ResponseStatus,

    #[serde(default)]
    pub results: Vec<QueryResult>,

    /// Execution time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,

    /// Informational messages emitted while the batch ran (print output,
    /// showplan, statistics io)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<ServerNotice>,

    /// Session the server bound this request to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success && self.error.is_none()
    }
}
