//! Command history persistence
//!
//! Keeps submitted batches across sessions in `~/.bsql_history`. Batches can
//! span several lines, so each entry is stored on one line with `\n` and `\\`
//! escaped.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CLIError, Result};

/// Default history file name under the home directory
pub const HISTORY_FILE_NAME: &str = ".bsql_history";

/// Command history manager
pub struct CommandHistory {
    path: PathBuf,
    max_size: usize,
}

impl CommandHistory {
    pub fn with_path<P: AsRef<Path>>(path: P, max_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_size,
        }
    }

    /// Load the most recent `max_size` entries, oldest first
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| CLIError::HistoryError(format!("Failed to read history file: {}", e)))?;

        let mut entries: Vec<String> = contents
            .lines()
            .filter(|l| !l.is_empty())
            .rev()
            .take(self.max_size)
            .map(unescape)
            .collect();
        entries.reverse();
        Ok(entries)
    }

    /// Rewrite the file with the last `max_size` entries
    pub fn save(&self, history: &[String]) -> Result<()> {
        self.ensure_parent()?;

        let skip = history.len().saturating_sub(self.max_size);
        let mut contents = history[skip..]
            .iter()
            .map(|s| escape(s))
            .collect::<Vec<_>>()
            .join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        std::fs::write(&self.path, contents)
            .map_err(|e| CLIError::HistoryError(format!("Failed to write history file: {}", e)))
    }

    /// Append one batch; blank entries and consecutive duplicates are skipped
    pub fn append(&self, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Ok(());
        }
        let history = self.load()?;
        if history.last().map(|s| s.as_str()) == Some(command) {
            return Ok(());
        }

        if history.len() >= self.max_size {
            let mut history = history;
            history.push(command.to_string());
            return self.save(&history);
        }

        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CLIError::HistoryError(format!("Failed to open history file: {}", e)))?;
        writeln!(file, "{}", escape(command))
            .map_err(|e| CLIError::HistoryError(format!("Failed to write history file: {}", e)))
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// `~/.bsql_history`, or the working directory when there is no home
pub fn default_history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HISTORY_FILE_NAME)
}

fn escape(entry: &str) -> String {
    entry.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_history_persistence() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);

        let commands = vec!["select 1".to_string(), "select 2".to_string()];
        history.save(&commands).unwrap();

        assert_eq!(history.load().unwrap(), commands);
    }

    #[test]
    fn test_history_max_size() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 2);

        history.append("select 1").unwrap();
        history.append("select 2").unwrap();
        history.append("select 3").unwrap();

        assert_eq!(history.load().unwrap(), vec!["select 2", "select 3"]);
    }

    #[test]
    fn test_multi_line_batches_round_trip() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("nested").join("history"), 10);

        history.append("select a,\n  b\nfrom t").unwrap();
        history.append(r"select 'C:\temp\new'").unwrap();
        history.append(r"\b").unwrap();

        let loaded = history.load().unwrap();
        assert_eq!(
            loaded,
            vec!["select a,\n  b\nfrom t", r"select 'C:\temp\new'", r"\b"]
        );
    }

    #[test]
    fn test_append_skips_duplicates_and_blanks() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);

        history.append("select 1").unwrap();
        history.append("select 1").unwrap();
        history.append("   ").unwrap();

        assert_eq!(history.load().unwrap().len(), 1);
    }
}
