//! Line-to-batch accumulation
//!
//! Folds lines into a batch buffer until the terminator matches. Also owns
//! the per-batch line counter shown in prompts and script echo.

use crate::source::ReadError;
use crate::terminator::Terminator;

/// Outcome of feeding one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Terminator not seen yet
    Pending,
    /// Terminator matched; the finalized batch text
    Ready(String),
}

/// Stateful reducer from lines to batches
#[derive(Debug, Clone)]
pub struct BatchAccumulator {
    terminator: Terminator,
    buffer: String,
    line_no: usize,
}

impl BatchAccumulator {
    pub fn new(terminator: Terminator) -> Self {
        Self {
            terminator,
            buffer: String::new(),
            line_no: 1,
        }
    }

    /// Feed one line (without its line ending).
    ///
    /// Lines are newline-joined; leading blank lines never start a batch.
    /// On a terminator match the stripped remainder of the line is appended,
    /// the batch is returned and the accumulator starts over.
    pub fn feed(&mut self, line: &str) -> Feed {
        let (stripped, matched) = self.terminator.strip(line);
        if !matched {
            self.push_line(line);
            self.line_no += 1;
            return Feed::Pending;
        }

        if !stripped.is_empty() {
            self.push_line(stripped);
        }
        let batch = std::mem::take(&mut self.buffer);
        self.line_no = 1;
        Feed::Ready(batch)
    }

    /// End of input: hands back whatever was pending as the error payload.
    pub fn finish(&mut self) -> ReadError {
        let pending = std::mem::take(&mut self.buffer);
        self.line_no = 1;
        ReadError::EndOfInput {
            pending: (!pending.is_empty()).then_some(pending),
        }
    }

    /// Discard the partial batch and restart at line 1
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.line_no = 1;
    }

    /// 1-based number of the line about to be fed
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    fn push_line(&mut self, line: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
    }
}
