use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use async_trait::async_trait;

use super::{BatchSource, ReadError};
use crate::accumulator::{BatchAccumulator, Feed};
use crate::config::EchoMode;
use crate::error::{CLIError, Result};
use crate::session::Session;
use crate::terminator::Terminator;

/// Reads batches from a finite line stream (script file or pipe).
///
/// There is no interrupt handling here; a scripted run is stopped by the
/// cancellation of the in-flight batch or by terminating the process.
pub struct ScriptedSource<R> {
    reader: R,
    accumulator: BatchAccumulator,
    echo: EchoMode,
    progress: Box<dyn Write + Send>,
}

impl ScriptedSource<BufReader<File>> {
    /// Open a script file
    pub fn open<P: AsRef<Path>>(path: P, terminator: Terminator) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CLIError::FileError(format!("cannot open input file '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file), terminator))
    }
}

impl<R: BufRead> ScriptedSource<R> {
    pub fn new(reader: R, terminator: Terminator) -> Self {
        Self {
            reader,
            accumulator: BatchAccumulator::new(terminator),
            echo: EchoMode::Off,
            progress: Box::new(io::stdout()),
        }
    }

    /// Echo every consumed line to stdout
    pub fn with_echo(mut self, echo: EchoMode) -> Self {
        self.echo = echo;
        self
    }

    /// Send echoed lines somewhere other than stdout
    pub fn with_progress_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.progress = sink;
        self
    }

    fn echo_line(&mut self, line: &str) -> io::Result<()> {
        match self.echo {
            EchoMode::Off => Ok(()),
            EchoMode::Numbered => {
                writeln!(self.progress, "{}> {}", self.accumulator.line_number(), line)
            }
            EchoMode::Plain => writeln!(self.progress, "{}", line),
        }
    }
}

fn trim_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

#[async_trait(?Send)]
impl<R: BufRead> BatchSource for ScriptedSource<R> {
    async fn read_batch(&mut self, _session: &dyn Session) -> std::result::Result<String, ReadError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return match self.accumulator.finish() {
                    ReadError::EndOfInput { pending: Some(batch) } => {
                        log::debug!("[SCRIPT] Submitting unterminated final batch");
                        Ok(batch)
                    }
                    end => Err(end),
                };
            }
            trim_line_ending(&mut line);
            self.echo_line(&line)?;

            if let Feed::Ready(batch) = self.accumulator.feed(&line) {
                return Ok(batch);
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.progress.flush()?;
        Ok(())
    }
}
