//! Batch sources
//!
//! A batch source turns a stream of lines into finalized batches. Two
//! implementations exist: [`ScriptedSource`] for files and pipes, and
//! [`InteractiveSource`] for a terminal with a line editor.

mod interactive;
mod scripted;

pub use interactive::InteractiveSource;
pub use scripted::ScriptedSource;

use std::fmt;

use async_trait::async_trait;

use crate::session::Session;

/// Why a source could not produce a batch
#[derive(Debug)]
pub enum ReadError {
    /// The input is exhausted. `pending` carries text that was accumulated
    /// without ever seeing a terminator.
    EndOfInput { pending: Option<String> },
    Io(std::io::Error),
    /// The line editor failed for a reason other than interrupt or EOF
    Editor(String),
}

impl ReadError {
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, ReadError::EndOfInput { .. })
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::EndOfInput { pending: None } => write!(f, "end of input"),
            ReadError::EndOfInput { pending: Some(_) } => {
                write!(f, "end of input with an unterminated batch")
            }
            ReadError::Io(e) => write!(f, "Read error: {}", e),
            ReadError::Editor(msg) => write!(f, "Input error: {}", msg),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        ReadError::Io(err)
    }
}

/// Producer of finalized batches
#[async_trait(?Send)]
pub trait BatchSource {
    /// Read lines until the terminator matches and return the batch text.
    ///
    /// The session is available for prompt decoration (home-server lookup).
    async fn read_batch(&mut self, session: &dyn Session) -> Result<String, ReadError>;

    /// Release whatever the source holds (history, file handles)
    fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }
}
