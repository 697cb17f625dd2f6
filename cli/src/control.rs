//! Control commands
//!
//! Three reserved batch literals drive the session's transaction primitives
//! directly instead of being submitted as query text:
//!
//! - `\b` - begin transaction
//! - `\c` - commit
//! - `\r` - rollback
//!
//! Matching is exact and case-sensitive on the finalized batch.

use crate::session::{Session, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Begin,
    Commit,
    Rollback,
}

impl ControlCommand {
    /// Recognize a finalized batch as a control command
    pub fn parse(batch: &str) -> Option<Self> {
        match batch {
            "\\b" => Some(ControlCommand::Begin),
            "\\c" => Some(ControlCommand::Commit),
            "\\r" => Some(ControlCommand::Rollback),
            _ => None,
        }
    }

    pub fn literal(&self) -> &'static str {
        match self {
            ControlCommand::Begin => "\\b",
            ControlCommand::Commit => "\\c",
            ControlCommand::Rollback => "\\r",
        }
    }

    /// Run the matching session primitive
    pub async fn dispatch(&self, session: &dyn Session) -> Result<(), SessionError> {
        match self {
            ControlCommand::Begin => session.begin().await,
            ControlCommand::Commit => session.commit().await,
            ControlCommand::Rollback => session.rollback().await,
        }
    }
}
