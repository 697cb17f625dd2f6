use async_trait::async_trait;

use super::{BatchSource, ReadError};
use crate::accumulator::{BatchAccumulator, Feed};
use crate::editor::{EditorError, LineEditor};
use crate::session::{ServerKind, Session, Value};
use crate::terminator::Terminator;

const SERVER_NAME_QUERY: &str = "select @@servername";

/// Reads batches from a line editor with a context-sensitive prompt.
///
/// Ctrl+C while typing throws away the batch in progress and starts again
/// at line 1. End of input drops any partial batch.
pub struct InteractiveSource<E> {
    editor: E,
    accumulator: BatchAccumulator,
    server_label: Option<String>,
}

impl<E: LineEditor> InteractiveSource<E> {
    pub fn new(editor: E, terminator: Terminator) -> Self {
        Self {
            editor,
            accumulator: BatchAccumulator::new(terminator),
            server_label: None,
        }
    }

    /// Home-server label, resolved on first use. A failed lookup falls back
    /// to the connection's server name and is retried on the next prompt.
    async fn server_label(&mut self, session: &dyn Session) -> String {
        if let Some(label) = &self.server_label {
            return label.clone();
        }

        let env = session.env();
        if !env.kind.needs_server_lookup() {
            self.server_label = Some(env.server.clone());
            return env.server.clone();
        }

        match session.introspect(SERVER_NAME_QUERY).await {
            Ok(Value::Null) => env.server.clone(),
            Ok(value) => {
                let label = value.to_string().trim().to_string();
                self.server_label = Some(label.clone());
                label
            }
            Err(e) => {
                log::debug!("[PROMPT] Server name lookup failed: {}", e);
                env.server.clone()
            }
        }
    }

    async fn prompt(&mut self, session: &dyn Session) -> String {
        let server = self.server_label(session).await;
        let env = session.env();
        let n = self.accumulator.line_number();
        match env.kind {
            ServerKind::Ase | ServerKind::SqlServer => {
                format!("{}.{} {} $ ", server, env.database, n)
            }
            ServerKind::SqlAnywhere | ServerKind::Other => format!("{} {} $ ", server, n),
        }
    }
}

#[async_trait(?Send)]
impl<E: LineEditor> BatchSource for InteractiveSource<E> {
    async fn read_batch(&mut self, session: &dyn Session) -> Result<String, ReadError> {
        loop {
            let prompt = self.prompt(session).await;
            self.editor.set_prompt(&prompt);

            let line = match self.editor.read_line() {
                Ok(line) => line,
                Err(EditorError::Interrupted) => {
                    self.accumulator.reset();
                    continue;
                }
                Err(EditorError::Eof) => {
                    self.accumulator.reset();
                    return Err(ReadError::EndOfInput { pending: None });
                }
                Err(EditorError::Other(msg)) => {
                    self.accumulator.reset();
                    return Err(ReadError::Editor(msg));
                }
            };

            if let Feed::Ready(batch) = self.accumulator.feed(&line) {
                self.editor.save_to_history(&batch);
                return Ok(batch);
            }
        }
    }
}
