//! Common utilities for bsql integration tests
//!
//! Provides an in-memory session that answers batches from a script of
//! replies, an editor fed from a list of lines, a manual interrupt, and a
//! cloneable output buffer.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use bsql_cli::cancel::{CancellationBridge, InterruptFuture, InterruptSource};
use bsql_cli::session::DiagnosticHandler;
use bsql_cli::{
    Diagnostic, EditorError, ExecutionLoop, LineEditor, ResultSet, RunConfig, ScriptedSource,
    ServerKind, Session, SessionEnv, SessionError, Terminator, Value,
};

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One scripted result set
#[derive(Clone, Debug, Default)]
pub struct MockSet {
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Value>>,
    pub rows_affected: Option<u64>,
    pub return_status: Option<i32>,
    /// Fail the row fetch after this many rows
    pub fail_after: Option<usize>,
}

impl MockSet {
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            rows,
            ..Default::default()
        }
    }

    pub fn affected(n: u64) -> Self {
        Self {
            columns: Some(Vec::new()),
            rows_affected: Some(n),
            ..Default::default()
        }
    }

    pub fn with_return_status(mut self, status: i32) -> Self {
        self.return_status = Some(status);
        self
    }

    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }
}

/// How the mock answers one batch
#[derive(Clone, Debug)]
pub enum Reply {
    Sets(Vec<MockSet>),
    /// Result sets, but moving past the first one fails
    SetsThenAdvanceError(Vec<MockSet>),
    Engine(Diagnostic),
    Failure(String),
    /// Block until the submission's token is cancelled
    HangUntilCancelled,
}

#[derive(Default)]
struct Inner {
    replies: HashMap<String, Reply>,
    submitted: Vec<String>,
    /// Token state observed when each submission returned
    cancelled_on_return: Vec<bool>,
    begins: usize,
    commits: usize,
    rollbacks: usize,
    introspections: usize,
}

/// Shared view of what the mock session saw
#[derive(Clone, Default)]
pub struct MockState(Arc<Mutex<Inner>>);

impl MockState {
    pub fn submitted(&self) -> Vec<String> {
        self.0.lock().unwrap().submitted.clone()
    }

    pub fn cancelled_on_return(&self) -> Vec<bool> {
        self.0.lock().unwrap().cancelled_on_return.clone()
    }

    pub fn begins(&self) -> usize {
        self.0.lock().unwrap().begins
    }

    pub fn commits(&self) -> usize {
        self.0.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.0.lock().unwrap().rollbacks
    }

    pub fn introspections(&self) -> usize {
        self.0.lock().unwrap().introspections
    }
}

pub struct MockSession {
    state: MockState,
    env: SessionEnv,
    handler: Option<DiagnosticHandler>,
    server_name: Option<String>,
    /// Client-side failure returned by `commit` instead of the engine error
    commit_failure: Option<String>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            state: MockState::default(),
            env: SessionEnv {
                kind: ServerKind::Other,
                server: "localhost".into(),
                database: "master".into(),
            },
            handler: None,
            server_name: None,
            commit_failure: None,
        }
    }

    pub fn with_kind(mut self, kind: ServerKind, server_name: &str) -> Self {
        self.env.kind = kind;
        self.server_name = Some(server_name.to_string());
        self
    }

    /// Only the kind; the server name lookup answers NULL
    pub fn with_kind_only(mut self, kind: ServerKind) -> Self {
        self.env.kind = kind;
        self
    }

    pub fn failing_commit(mut self, message: &str) -> Self {
        self.commit_failure = Some(message.to_string());
        self
    }

    pub fn reply(self, batch: &str, reply: Reply) -> Self {
        self.state
            .0
            .lock()
            .unwrap()
            .replies
            .insert(batch.to_string(), reply);
        self
    }

    pub fn state(&self) -> MockState {
        self.state.clone()
    }

    fn notify(&self, diag: &Diagnostic) -> bool {
        match &self.handler {
            Some(handler) => handler(diag),
            None => diag.severity > 10,
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn submit(
        &self,
        batch: &str,
        cancel: CancellationToken,
    ) -> Result<Box<dyn ResultSet>, SessionError> {
        let reply = {
            let mut inner = self.state.0.lock().unwrap();
            inner.submitted.push(batch.to_string());
            inner
                .replies
                .get(batch)
                .cloned()
                .unwrap_or(Reply::Sets(Vec::new()))
        };

        let result: Result<Box<dyn ResultSet>, SessionError> = match reply {
            Reply::Sets(sets) => Ok(Box::new(MockResultSet::new(sets, false))),
            Reply::SetsThenAdvanceError(sets) => Ok(Box::new(MockResultSet::new(sets, true))),
            Reply::Engine(diag) => {
                self.notify(&diag);
                Err(SessionError::Engine(diag))
            }
            Reply::Failure(msg) => Err(SessionError::Other(msg)),
            Reply::HangUntilCancelled => {
                cancel.cancelled().await;
                Err(SessionError::Cancelled)
            }
        };

        self.state
            .0
            .lock()
            .unwrap()
            .cancelled_on_return
            .push(cancel.is_cancelled());
        result
    }

    async fn begin(&self) -> Result<(), SessionError> {
        self.state.0.lock().unwrap().begins += 1;
        Ok(())
    }

    async fn commit(&self) -> Result<(), SessionError> {
        self.state.0.lock().unwrap().commits += 1;
        if let Some(message) = &self.commit_failure {
            return Err(SessionError::Other(message.clone()));
        }
        let diag = Diagnostic {
            severity: 16,
            number: 3902,
            text: "The COMMIT TRANSACTION request has no corresponding BEGIN TRANSACTION.".into(),
        };
        self.notify(&diag);
        Err(SessionError::Engine(diag))
    }

    async fn rollback(&self) -> Result<(), SessionError> {
        self.state.0.lock().unwrap().rollbacks += 1;
        Ok(())
    }

    fn set_diagnostic_handler(&mut self, handler: DiagnosticHandler) {
        self.handler = Some(handler);
    }

    async fn introspect(&self, _query: &str) -> Result<Value, SessionError> {
        self.state.0.lock().unwrap().introspections += 1;
        match &self.server_name {
            Some(name) => Ok(Value::Text(name.clone())),
            None => Ok(Value::Null),
        }
    }

    fn env(&self) -> &SessionEnv {
        &self.env
    }
}

pub struct MockResultSet {
    current: Option<MockSet>,
    rows: VecDeque<Vec<Value>>,
    fetched: usize,
    pending: VecDeque<MockSet>,
    advance_error: bool,
}

impl MockResultSet {
    fn new(sets: Vec<MockSet>, advance_error: bool) -> Self {
        let mut pending: VecDeque<MockSet> = sets.into();
        let current = pending.pop_front();
        let rows = current
            .as_ref()
            .map(|s| s.rows.clone().into())
            .unwrap_or_default();
        Self {
            current,
            rows,
            fetched: 0,
            pending,
            advance_error,
        }
    }
}

#[async_trait]
impl ResultSet for MockResultSet {
    fn columns(&self) -> Option<&[String]> {
        self.current.as_ref().and_then(|s| s.columns.as_deref())
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Value>>, SessionError> {
        let fail_after = self.current.as_ref().and_then(|s| s.fail_after);
        if fail_after == Some(self.fetched) {
            return Err(SessionError::Other("connection reset by peer".into()));
        }
        self.fetched += 1;
        Ok(self.rows.pop_front())
    }

    fn rows_affected(&self) -> Option<u64> {
        self.current.as_ref().and_then(|s| s.rows_affected)
    }

    fn return_status(&self) -> Option<i32> {
        self.current.as_ref().and_then(|s| s.return_status)
    }

    fn has_next_result_set(&self) -> bool {
        !self.pending.is_empty()
    }

    async fn advance_to_next_result_set(&mut self) -> Result<(), SessionError> {
        if self.advance_error {
            return Err(SessionError::Other("lost connection while reading results".into()));
        }
        match self.pending.pop_front() {
            Some(next) => {
                self.rows = next.rows.clone().into();
                self.fetched = 0;
                self.current = Some(next);
                Ok(())
            }
            None => Err(SessionError::Other("no more result sets".into())),
        }
    }
}

/// Editor fed from a fixed list; `Eof` once the list runs out
pub struct ScriptedEditor {
    lines: VecDeque<Result<String, EditorError>>,
    prompt: String,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub history: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEditor {
    pub fn new(lines: Vec<Result<&str, EditorError>>) -> Self {
        Self {
            lines: lines.into_iter().map(|l| l.map(str::to_string)).collect(),
            prompt: String::new(),
            prompts: Arc::default(),
            history: Arc::default(),
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    fn read_line(&mut self) -> Result<String, EditorError> {
        self.prompts.lock().unwrap().push(self.prompt.clone());
        self.lines.pop_front().unwrap_or(Err(EditorError::Eof))
    }

    fn save_to_history(&mut self, entry: &str) {
        self.history.lock().unwrap().push(entry.to_string());
    }
}

/// Interrupt fired by hand. Counts the listeners waiting on it.
#[derive(Default)]
pub struct ManualInterrupt {
    notify: Arc<Notify>,
    live: Arc<AtomicUsize>,
    armed: Arc<AtomicUsize>,
}

impl ManualInterrupt {
    pub fn trigger(&self) {
        self.notify.notify_one();
    }

    /// Listeners whose wait future still exists
    pub fn live_listeners(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Listeners ever created
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }
}

struct ListenerGuard(Arc<AtomicUsize>);

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InterruptSource for ManualInterrupt {
    fn notified(&self) -> InterruptFuture {
        self.armed.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = ListenerGuard(self.live.clone());
        let notify = self.notify.clone();
        Box::pin(async move {
            let _guard = guard;
            notify.notified().await
        })
    }
}

/// Output of one scripted run
pub struct RunOutput {
    pub out: String,
    pub err: String,
    pub result: bsql_cli::Result<()>,
}

/// Execution loop over a mock session, writing into in-memory buffers
pub fn build_loop(
    session: MockSession,
    config: RunConfig,
    interrupt: Arc<ManualInterrupt>,
) -> (ExecutionLoop, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let executor = ExecutionLoop::new(Box::new(session), config)
        .with_output(Box::new(out.clone()))
        .with_error_sink(Box::new(err.clone()))
        .with_bridge(CancellationBridge::new(interrupt));
    (executor, out, err)
}

/// Run `script` through a scripted source against `session`
pub async fn run_script(session: MockSession, config: RunConfig, script: &str) -> RunOutput {
    run_script_with_interrupt(session, config, script, Arc::new(ManualInterrupt::default())).await
}

pub async fn run_script_with_interrupt(
    session: MockSession,
    config: RunConfig,
    script: &str,
    interrupt: Arc<ManualInterrupt>,
) -> RunOutput {
    let terminator: Terminator = config.terminator.clone();
    let (mut executor, out, err) = build_loop(session, config, interrupt);
    let mut source = ScriptedSource::new(Cursor::new(script.as_bytes().to_vec()), terminator)
        .with_progress_sink(Box::new(io::sink()));
    let result = executor.run(&mut source).await;
    RunOutput {
        out: out.contents(),
        err: err.contents(),
        result,
    }
}

/// Run config with a plain ASCII theme, for predictable output
pub fn ascii_config() -> RunConfig {
    RunConfig::builder()
        .theme("ASCIICompact")
        .build()
        .unwrap()
}
