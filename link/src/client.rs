//! Main bsql-link client with builder pattern.
//!
//! Provides the connection to an HTTP SQL endpoint and batch execution.

use crate::{
    error::{LinkError, Result},
    models::{HealthCheckResponse, QueryResponse},
    query::QueryExecutor,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Client for an HTTP SQL endpoint.
///
/// Use [`LinkClientBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use bsql_link::LinkClient;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LinkClient::builder()
///     .base_url("http://localhost:8080")
///     .database("master")
///     .build()?;
///
/// let response = client.execute_query("select 1", &CancellationToken::new()).await?;
/// println!("{} result set(s)", response.results.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LinkClient {
    base_url: String,
    database: Option<String>,
    http_client: reqwest::Client,
    query_executor: QueryExecutor,
}

impl LinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> LinkClientBuilder {
        LinkClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Execute a batch, abandoning the request as soon as `cancel` fires.
    pub async fn execute_query(
        &self,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<QueryResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("[LINK_QUERY] Batch cancelled by caller");
                Err(LinkError::Cancelled)
            }
            result = self.query_executor.execute(sql) => result,
        }
    }

    /// Execute a statement that is never cancelled (transaction control,
    /// introspection)
    pub async fn execute_statement(&self, sql: &str) -> Result<QueryResponse> {
        self.query_executor.execute(sql).await
    }

    /// Check server health and get server information
    pub async fn health_check(&self) -> Result<HealthCheckResponse> {
        let url = format!("{}/v1/api/healthcheck", self.base_url);
        log::debug!("[HEALTH_CHECK] Fetching from url={}", url);
        let start = std::time::Instant::now();
        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        log::debug!(
            "[HEALTH_CHECK] HTTP response received in {:?}, status={}",
            start.elapsed(),
            status
        );
        if !status.is_success() {
            return Err(LinkError::ServerError {
                status_code: status.as_u16(),
                message: "health check failed".to_string(),
                detail: None,
            });
        }
        Ok(response.json::<HealthCheckResponse>().await?)
    }
}

/// Builder for configuring [`LinkClient`] instances.
pub struct LinkClientBuilder {
    base_url: Option<String>,
    database: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Duration,
}

impl LinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            database: None,
            timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set the base URL of the SQL endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Database every batch runs in
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Per-request timeout; `None` waits for the server indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// TCP + TLS handshake timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<LinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| LinkError::ConfigurationError("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LinkError::ConfigurationError(format!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let mut client_builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(1);
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let http_client = client_builder
            .build()
            .map_err(|e| LinkError::ConfigurationError(e.to_string()))?;

        let query_executor =
            QueryExecutor::new(base_url.clone(), http_client.clone(), self.database.clone());

        Ok(LinkClient {
            base_url,
            database: self.database,
            http_client,
            query_executor,
        })
    }
}
