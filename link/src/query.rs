//! SQL batch execution with HTTP transport.

use crate::{
    error::{LinkError, Result},
    models::{QueryRequest, QueryResponse},
};
use log::debug;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Handles batch execution via HTTP.
///
/// Remembers the session id handed out by the server so consecutive batches
/// (and the transactions they open) stay on one server-side session.
#[derive(Clone)]
pub struct QueryExecutor {
    base_url: String,
    http_client: reqwest::Client,
    database: Option<String>,
    session_id: Arc<Mutex<Option<String>>>,
}

impl QueryExecutor {
    pub(crate) fn new(
        base_url: String,
        http_client: reqwest::Client,
        database: Option<String>,
    ) -> Self {
        Self {
            base_url,
            http_client,
            database,
            session_id: Arc::new(Mutex::new(None)),
        }
    }

    /// Execute one batch. A single attempt is made; a failed request is
    /// reported to the caller as-is.
    pub async fn execute(&self, sql: &str) -> Result<QueryResponse> {
        let request = QueryRequest {
            sql: sql.to_string(),
            database: self.database.clone(),
            session_id: self.session_id.lock().await.clone(),
        };

        let sql_preview = if sql.len() > 80 {
            let cut = (0..=80).rev().find(|i| sql.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &sql[..cut])
        } else {
            sql.to_string()
        };
        debug!(
            "[LINK_QUERY] Starting batch: \"{}\" (len={})",
            sql_preview.replace('\n', " "),
            sql.len()
        );

        let url = format!("{}/v1/api/sql", self.base_url);
        let start = Instant::now();
        let response = self.http_client.post(&url).json(&request).send().await?;
        let status = response.status();
        debug!(
            "[LINK_HTTP] Response received: status={} duration_ms={}",
            status,
            start.elapsed().as_millis()
        );

        if status.is_success() {
            let query_response: QueryResponse = response.json().await?;
            if let Some(ref id) = query_response.session_id {
                *self.session_id.lock().await = Some(id.clone());
            }
            debug!("[LINK_QUERY] Success: total_ms={}", start.elapsed().as_millis());
            return Ok(query_response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // The body is usually a QueryResponse carrying the engine error
        let detail = serde_json::from_str::<QueryResponse>(&error_text)
            .ok()
            .and_then(|r| r.error);
        let message = detail
            .as_ref()
            .map(|d| d.message.clone())
            .unwrap_or(error_text);

        // Engine errors reach the user through the diagnostic channel
        debug!(
            "[LINK_HTTP] Server error: status={} message=\"{}\" duration_ms={}",
            status,
            message,
            start.elapsed().as_millis()
        );

        Err(LinkError::ServerError {
            status_code: status.as_u16(),
            message,
            detail,
        })
    }
}
