//! Batch terminator matching
//!
//! A terminator is a caller-supplied regular expression that, when it matches
//! at the very end of a line, marks that line as the last line of a batch.
//! The pattern is wrapped in a non-capturing group before anchoring so
//! alternations such as `;|^go` are anchored as a whole.

use regex::Regex;

use crate::error::{CLIError, Result};

/// Default terminator: a trailing semicolon, or a line that is exactly `go`
pub const DEFAULT_TERMINATOR: &str = ";|^go";

/// Compiled, end-anchored terminator pattern
#[derive(Debug, Clone)]
pub struct Terminator {
    regex: Regex,
}

impl Terminator {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(CLIError::ConfigurationError(
                "terminator pattern must not be empty".into(),
            ));
        }
        let regex = Regex::new(&format!("(?:{})$", pattern)).map_err(|e| {
            CLIError::ConfigurationError(format!("invalid terminator pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    /// Strip a trailing terminator from `line`.
    ///
    /// Returns the line without the matched suffix and `true` when the
    /// terminator matched, otherwise the untouched line and `false`. An empty
    /// match never counts, so a reported match always removes at least one
    /// character.
    pub fn strip<'a>(&self, line: &'a str) -> (&'a str, bool) {
        match self.regex.find(line) {
            Some(m) if m.end() > m.start() => (&line[..m.start()], true),
            _ => (line, false),
        }
    }
}

impl Default for Terminator {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINATOR).expect("default terminator is a valid regex")
    }
}
