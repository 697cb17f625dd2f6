//! Database session contracts
//!
//! The execution loop only talks to a session through these traits, so the
//! batch machinery does not depend on which protocol backs it. The HTTP
//! implementation lives in [`crate::link_session`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;

/// A single row value as produced by the protocol layer
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

/// Engine family behind the session; decides the prompt shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    Ase,
    SqlServer,
    SqlAnywhere,
    Other,
}

impl ServerKind {
    /// Classify the engine name reported by the server
    pub fn from_engine_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("anywhere") {
            ServerKind::SqlAnywhere
        } else if lower.contains("adaptive server")
            || lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "ase")
        {
            ServerKind::Ase
        } else if lower.contains("sql server") || lower.contains("mssql") {
            ServerKind::SqlServer
        } else {
            ServerKind::Other
        }
    }

    /// Whether the home-server label has to be asked for with
    /// `select @@servername`
    pub fn needs_server_lookup(&self) -> bool {
        !matches!(self, ServerKind::Other)
    }
}

/// Static facts about the connected session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnv {
    pub kind: ServerKind,
    /// Server name from the connection parameters
    pub server: String,
    pub database: String,
}

/// A message from the engine's diagnostic side-channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: u8,
    pub number: i32,
    pub text: String,
}

/// Callback invoked for every diagnostic. Returning `true` marks the
/// operation as failed.
pub type DiagnosticHandler = Arc<dyn Fn(&Diagnostic) -> bool + Send + Sync>;

/// Failure of a session operation
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The engine reported the error; it already went through the
    /// diagnostic handler
    Engine(Diagnostic),
    /// The submission's cancellation token fired
    Cancelled,
    /// Transport or client-side failure
    Other(String),
}

impl SessionError {
    pub fn is_engine_reported(&self) -> bool {
        matches!(self, SessionError::Engine(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Engine(d) => {
                write!(f, "Msg {}, Level {}: {}", d.number, d.severity, d.text.trim_end())
            }
            SessionError::Cancelled => write!(f, "Batch cancelled"),
            SessionError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

/// A streaming result set. Result sets of one batch are consumed strictly in
/// order; each is exhausted before the next is requested.
#[async_trait]
pub trait ResultSet: Send {
    /// Column names, or `None` when the current result set has nothing to
    /// render (as opposed to an empty column list)
    fn columns(&self) -> Option<&[String]>;

    /// Fetch the next row; `Ok(None)` at the end of the result set
    async fn next_row(&mut self) -> Result<Option<Vec<Value>>, SessionError>;

    fn rows_affected(&self) -> Option<u64>;

    fn return_status(&self) -> Option<i32>;

    fn has_next_result_set(&self) -> bool;

    async fn advance_to_next_result_set(&mut self) -> Result<(), SessionError>;
}

/// A connected database session
#[async_trait]
pub trait Session: Send + Sync {
    /// Submit one batch. The token is cancelled when the user interrupts.
    async fn submit(
        &self,
        batch: &str,
        cancel: CancellationToken,
    ) -> Result<Box<dyn ResultSet>, SessionError>;

    async fn begin(&self) -> Result<(), SessionError>;

    async fn commit(&self) -> Result<(), SessionError>;

    async fn rollback(&self) -> Result<(), SessionError>;

    fn set_diagnostic_handler(&mut self, handler: DiagnosticHandler);

    /// Run a scalar side-channel query (home-server lookup)
    async fn introspect(&self, query: &str) -> Result<Value, SessionError>;

    fn env(&self) -> &SessionEnv;
}
