//! Library entry point for bsql components.
//!
//! The batch machinery (terminator matching, accumulation, sources, the
//! execution loop and rendering) is independent of the session protocol;
//! [`link_session`] plugs in the HTTP client. Everything is exposed so
//! integration tests can drive the loop with in-memory sessions.

pub mod accumulator;
pub mod cancel;
pub mod config;
pub mod control;
pub mod editor;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod history;
pub mod link_session;
pub mod logging;
pub mod notice;
pub mod render;
pub mod session;
pub mod source;
pub mod terminator;

#[cfg(test)]
mod test_support;

pub use accumulator::{BatchAccumulator, Feed};
pub use cancel::{CancellationBridge, InterruptSource};
pub use config::{CLIConfiguration, EchoMode, RunConfig};
pub use control::ControlCommand;
pub use editor::{EditorError, LineEditor, RustylineEditor};
pub use error::{CLIError, Result};
pub use executor::ExecutionLoop;
pub use formatter::{TableRenderer, TextTable, Theme};
pub use link_session::LinkSession;
pub use session::{Diagnostic, ResultSet, ServerKind, Session, SessionEnv, SessionError, Value};
pub use source::{BatchSource, InteractiveSource, ReadError, ScriptedSource};
pub use terminator::Terminator;
