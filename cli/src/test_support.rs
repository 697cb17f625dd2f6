//! In-memory doubles shared by unit tests

use std::collections::VecDeque;
use std::io::{self, Write};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::formatter::TableRenderer;
use crate::session::{
    DiagnosticHandler, ResultSet, ServerKind, Session, SessionEnv, SessionError, Value,
};

/// Session that is never connected
pub struct NullSession {
    env: SessionEnv,
}

impl Default for NullSession {
    fn default() -> Self {
        Self {
            env: SessionEnv {
                kind: ServerKind::Other,
                server: "localhost".into(),
                database: "master".into(),
            },
        }
    }
}

#[async_trait]
impl Session for NullSession {
    async fn submit(
        &self,
        _batch: &str,
        _cancel: CancellationToken,
    ) -> Result<Box<dyn ResultSet>, SessionError> {
        Err(SessionError::Other("not connected".into()))
    }

    async fn begin(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn commit(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), SessionError> {
        Ok(())
    }

    fn set_diagnostic_handler(&mut self, _handler: DiagnosticHandler) {}

    async fn introspect(&self, _query: &str) -> Result<Value, SessionError> {
        Ok(Value::Null)
    }

    fn env(&self) -> &SessionEnv {
        &self.env
    }
}

/// Table that only counts renders
#[derive(Default)]
pub struct CountingTable {
    pub renders: usize,
}

impl TableRenderer for CountingTable {
    fn set_header(&mut self, _columns: &[String]) {}

    fn append_row(&mut self, _row: Vec<String>) {}

    fn render(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        self.renders += 1;
        Ok(())
    }
}

/// One result set with fixed rows
pub struct StaticResultSet {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    fail_after: Option<usize>,
    fetched: usize,
}

impl StaticResultSet {
    pub fn single(columns: Vec<&str>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into_iter().map(str::to_string).collect(),
            rows: rows.into(),
            fail_after: None,
            fetched: 0,
        }
    }

    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }
}

#[async_trait]
impl ResultSet for StaticResultSet {
    fn columns(&self) -> Option<&[String]> {
        Some(&self.columns)
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Value>>, SessionError> {
        if self.fail_after == Some(self.fetched) {
            return Err(SessionError::Other("connection reset".into()));
        }
        self.fetched += 1;
        Ok(self.rows.pop_front())
    }

    fn rows_affected(&self) -> Option<u64> {
        None
    }

    fn return_status(&self) -> Option<i32> {
        None
    }

    fn has_next_result_set(&self) -> bool {
        false
    }

    async fn advance_to_next_result_set(&mut self) -> Result<(), SessionError> {
        Err(SessionError::Other("no more result sets".into()))
    }
}
