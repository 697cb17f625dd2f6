//! Line editor abstraction
//!
//! The interactive source only needs three things from a terminal widget:
//! a prompt, one line at a time, and a place to store finished batches.

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, EditMode, Editor};

use crate::error::Result;
use crate::history::CommandHistory;

/// Line editor failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Ctrl+C while editing
    Interrupted,
    /// Ctrl+D or closed terminal
    Eof,
    Other(String),
}

impl From<ReadlineError> for EditorError {
    fn from(err: ReadlineError) -> Self {
        match err {
            ReadlineError::Interrupted => EditorError::Interrupted,
            ReadlineError::Eof => EditorError::Eof,
            other => EditorError::Other(other.to_string()),
        }
    }
}

pub trait LineEditor {
    fn set_prompt(&mut self, prompt: &str);

    fn read_line(&mut self) -> std::result::Result<String, EditorError>;

    /// Record a finalized batch
    fn save_to_history(&mut self, entry: &str);
}

/// rustyline-backed editor with a persistent history file
pub struct RustylineEditor {
    editor: Editor<(), DefaultHistory>,
    history: CommandHistory,
    prompt: String,
}

impl RustylineEditor {
    pub fn new(history_path: PathBuf, history_size: usize) -> Result<Self> {
        let config = Config::builder()
            .edit_mode(EditMode::Emacs)
            .max_history_size(history_size)?
            .auto_add_history(false) // only whole batches go to history
            .build();
        let mut editor = Editor::<(), DefaultHistory>::with_config(config)?;

        let history = CommandHistory::with_path(history_path, history_size);
        match history.load() {
            Ok(entries) => {
                for entry in entries {
                    let _ = editor.add_history_entry(entry);
                }
            }
            Err(e) => log::warn!("[HISTORY] {}", e),
        }

        Ok(Self {
            editor,
            history,
            prompt: String::new(),
        })
    }
}

impl LineEditor for RustylineEditor {
    fn set_prompt(&mut self, prompt: &str) {
        self.prompt.clear();
        self.prompt.push_str(prompt);
    }

    fn read_line(&mut self) -> std::result::Result<String, EditorError> {
        Ok(self.editor.readline(&self.prompt)?)
    }

    fn save_to_history(&mut self, entry: &str) {
        let _ = self.editor.add_history_entry(entry);
        if let Err(e) = self.history.append(entry) {
            log::warn!("[HISTORY] {}", e);
        }
    }
}
