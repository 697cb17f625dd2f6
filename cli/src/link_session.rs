//! [`Session`] over the bsql-link HTTP client
//!
//! One HTTP round trip returns every result set of a batch plus the notices
//! the engine emitted. Notices and engine errors are replayed through the
//! registered diagnostic handler before the result sets are handed out.

use std::collections::VecDeque;

use async_trait::async_trait;
use base64::Engine as _;
use bsql_link::{ErrorDetail, LinkClient, LinkError, QueryResponse, QueryResult, SqlDataType};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_DATABASE;
use crate::error::CLIError;
use crate::session::{
    Diagnostic, DiagnosticHandler, ResultSet, ServerKind, Session, SessionEnv, SessionError, Value,
};

pub struct LinkSession {
    client: LinkClient,
    env: SessionEnv,
    handler: Option<DiagnosticHandler>,
}

impl LinkSession {
    /// Check the server and build the session environment from its answer
    pub async fn connect(client: LinkClient) -> Result<Self, LinkError> {
        let health = client.health_check().await?;
        log::debug!(
            "[CONNECT] status={} version={} engine={:?}",
            health.status,
            health.version,
            health.engine
        );

        let kind = health
            .engine
            .as_deref()
            .map(ServerKind::from_engine_name)
            .unwrap_or(ServerKind::Other);
        let server = health
            .server_name
            .clone()
            .unwrap_or_else(|| host_of(client.base_url()).to_string());
        let database = client.database().unwrap_or(DEFAULT_DATABASE).to_string();

        Ok(Self::from_parts(
            client,
            SessionEnv {
                kind,
                server,
                database,
            },
        ))
    }

    pub fn from_parts(client: LinkClient, env: SessionEnv) -> Self {
        Self {
            client,
            env,
            handler: None,
        }
    }

    /// Hand a diagnostic to the handler; `true` means fail the operation
    fn notify(&self, diag: &Diagnostic) -> bool {
        match &self.handler {
            Some(handler) => handler(diag),
            None => diag.severity > 10,
        }
    }

    fn engine_error(&self, detail: &ErrorDetail) -> SessionError {
        let diag = Diagnostic {
            severity: detail.severity_or_default(),
            number: detail.number(),
            text: detail.message.clone(),
        };
        self.notify(&diag);
        SessionError::Engine(diag)
    }

    fn map_link_error(&self, err: LinkError) -> SessionError {
        match err {
            LinkError::Cancelled => SessionError::Cancelled,
            LinkError::ServerError {
                detail: Some(detail),
                ..
            } => self.engine_error(&detail),
            other => SessionError::Other(CLIError::from(other).to_string()),
        }
    }

    /// Replay notices, then turn an engine error into a failure
    fn check(&self, response: QueryResponse) -> Result<QueryResponse, SessionError> {
        let mut failed = None;
        for notice in &response.notices {
            let diag = Diagnostic {
                severity: notice.severity,
                number: notice.number,
                text: notice.text.clone(),
            };
            if self.notify(&diag) && failed.is_none() {
                failed = Some(diag);
            }
        }

        if let Some(detail) = &response.error {
            return Err(self.engine_error(detail));
        }
        if let Some(diag) = failed {
            return Err(SessionError::Engine(diag));
        }
        if !response.is_success() {
            return Err(SessionError::Other(format!(
                "server answered with status '{}'",
                response.status
            )));
        }
        Ok(response)
    }

    async fn run_statement(&self, sql: &str) -> Result<QueryResponse, SessionError> {
        let response = self
            .client
            .execute_statement(sql)
            .await
            .map_err(|e| self.map_link_error(e))?;
        self.check(response)
    }
}

#[async_trait]
impl Session for LinkSession {
    async fn submit(
        &self,
        batch: &str,
        cancel: CancellationToken,
    ) -> Result<Box<dyn ResultSet>, SessionError> {
        let response = self
            .client
            .execute_query(batch, &cancel)
            .await
            .map_err(|e| self.map_link_error(e))?;
        let response = self.check(response)?;
        Ok(Box::new(LinkResultSet::new(response.results)))
    }

    async fn begin(&self) -> Result<(), SessionError> {
        self.run_statement("begin transaction").await.map(|_| ())
    }

    async fn commit(&self) -> Result<(), SessionError> {
        self.run_statement("commit transaction").await.map(|_| ())
    }

    async fn rollback(&self) -> Result<(), SessionError> {
        self.run_statement("rollback transaction").await.map(|_| ())
    }

    fn set_diagnostic_handler(&mut self, handler: DiagnosticHandler) {
        self.handler = Some(handler);
    }

    async fn introspect(&self, query: &str) -> Result<Value, SessionError> {
        let response = self.run_statement(query).await?;
        let mut rs = LinkResultSet::new(response.results);
        let value = rs
            .next_row()
            .await?
            .and_then(|row| row.into_iter().next())
            .unwrap_or(Value::Null);
        Ok(value)
    }

    fn env(&self) -> &SessionEnv {
        &self.env
    }
}

/// `host:port` part of a base URL
fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

struct CurrentSet {
    columns: Vec<String>,
    types: Vec<SqlDataType>,
    rows: std::vec::IntoIter<Vec<JsonValue>>,
    rows_affected: Option<u64>,
    return_status: Option<i32>,
}

impl CurrentSet {
    fn new(mut result: QueryResult) -> Self {
        let columns = result.column_names();
        result.schema.sort_by_key(|f| f.index);
        let rows_affected = result.rows_affected();
        Self {
            columns,
            types: result.schema.into_iter().map(|f| f.data_type).collect(),
            rows: result.rows.unwrap_or_default().into_iter(),
            rows_affected,
            return_status: result.return_status,
        }
    }
}

/// Result sets of one HTTP response, handed out one at a time
pub struct LinkResultSet {
    current: Option<CurrentSet>,
    pending: VecDeque<QueryResult>,
}

impl LinkResultSet {
    pub fn new(results: Vec<QueryResult>) -> Self {
        let mut pending: VecDeque<QueryResult> = results.into();
        let current = pending.pop_front().map(CurrentSet::new);
        Self { current, pending }
    }
}

#[async_trait]
impl ResultSet for LinkResultSet {
    fn columns(&self) -> Option<&[String]> {
        self.current.as_ref().map(|c| c.columns.as_slice())
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Value>>, SessionError> {
        let Some(current) = self.current.as_mut() else {
            return Ok(None);
        };
        Ok(current.rows.next().map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(i, cell)| convert_value(cell, current.types.get(i)))
                .collect()
        }))
    }

    fn rows_affected(&self) -> Option<u64> {
        self.current.as_ref().and_then(|c| c.rows_affected)
    }

    fn return_status(&self) -> Option<i32> {
        self.current.as_ref().and_then(|c| c.return_status)
    }

    fn has_next_result_set(&self) -> bool {
        !self.pending.is_empty()
    }

    async fn advance_to_next_result_set(&mut self) -> Result<(), SessionError> {
        match self.pending.pop_front() {
            Some(next) => {
                self.current = Some(CurrentSet::new(next));
                Ok(())
            }
            None => Err(SessionError::Other("no further result set".into())),
        }
    }
}

/// Map a JSON cell to a [`Value`] using the column type
pub fn convert_value(cell: JsonValue, data_type: Option<&SqlDataType>) -> Value {
    match (cell, data_type) {
        (JsonValue::Null, _) => Value::Null,
        (cell, Some(ty)) if ty.is_temporal_instant() => match parse_instant(&cell) {
            Some(ts) => Value::Timestamp(ts),
            None => plain_value(cell),
        },
        (JsonValue::String(s), Some(ty)) if ty.is_binary() => {
            match base64::engine::general_purpose::STANDARD.decode(s.as_bytes()) {
                Ok(bytes) => Value::Bytes(bytes),
                Err(_) => Value::Text(s),
            }
        }
        (cell, _) => plain_value(cell),
    }
}

fn plain_value(cell: JsonValue) -> Value {
    match cell {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or_else(|| Value::Text(n.to_string())),
        },
        JsonValue::String(s) => Value::Text(s),
        other => Value::Text(other.to_string()),
    }
}

/// RFC 3339 / `YYYY-MM-DD HH:MM:SS[.f]` strings, or epoch microseconds
fn parse_instant(cell: &JsonValue) -> Option<NaiveDateTime> {
    match cell {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok(),
        JsonValue::Number(n) => {
            let micros = n.as_i64()?;
            let secs = micros.div_euclid(1_000_000);
            let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
            DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}
