use serde::{Deserialize, Serialize};

/// Health check response from the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Health status (e.g., "healthy")
    pub status: String,

    /// Server version
    #[serde(default)]
    pub version: String,

    /// Engine family behind the endpoint (e.g. "ASE", "sql server", "SQL Anywhere")
    #[serde(default)]
    pub engine: Option<String>,

    /// Name the server reports for itself
    #[serde(default)]
    pub server_name: Option<String>,
}
