//! Batch execution loop
//!
//! Pulls batches from a [`BatchSource`], intercepts control commands,
//! submits everything else with a per-batch cancellation bridge, and
//! renders each result set followed by its summary line.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

use crate::cancel::{CancellationBridge, Retirement};
use crate::config::RunConfig;
use crate::control::ControlCommand;
use crate::error::{CLIError, Result};
use crate::formatter::TextTable;
use crate::render::{render_rows, Summary};
use crate::session::{ResultSet, Session};
use crate::source::BatchSource;

fn output_error(err: io::Error) -> CLIError {
    CLIError::OutputError(err.to_string())
}

pub struct ExecutionLoop {
    session: Box<dyn Session>,
    config: RunConfig,
    bridge: CancellationBridge,
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl ExecutionLoop {
    /// Loop writing results to stdout and errors to stderr, cancelled by
    /// OS interrupts
    pub fn new(session: Box<dyn Session>, config: RunConfig) -> Self {
        Self {
            session,
            config,
            bridge: CancellationBridge::os(),
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    pub fn with_error_sink(mut self, err: Box<dyn Write + Send>) -> Self {
        self.err = err;
        self
    }

    pub fn with_bridge(mut self, bridge: CancellationBridge) -> Self {
        self.bridge = bridge;
        self
    }

    /// Run until the source is exhausted.
    ///
    /// Only a failure to move to the next result set (or to write output)
    /// aborts the run with an error; everything else is reported and the
    /// loop carries on or stops cleanly.
    pub async fn run(&mut self, source: &mut dyn BatchSource) -> Result<()> {
        let outcome = self.drive(source).await;
        let closed = source.close();
        if let Err(e) = self.out.flush() {
            log::warn!("[EXEC] Failed to flush output: {}", e);
        }
        outcome.and(closed)
    }

    async fn drive(&mut self, source: &mut dyn BatchSource) -> Result<()> {
        loop {
            let batch = match source.read_batch(self.session.as_ref()).await {
                Ok(batch) => batch,
                Err(e) if e.is_end_of_input() => return Ok(()),
                Err(e) => {
                    self.report(&e);
                    return Ok(());
                }
            };

            if let Some(command) = ControlCommand::parse(&batch) {
                log::debug!("[EXEC] Control command {}", command.literal());
                match command.dispatch(self.session.as_ref()).await {
                    Ok(()) => {}
                    Err(e) if e.is_engine_reported() => {
                        log::debug!("[EXEC] {} failed: {}", command.literal(), e);
                    }
                    Err(e) => self.report(&e),
                }
                continue;
            }

            if batch.trim().is_empty() {
                continue;
            }

            self.execute_batch(&batch).await?;
        }
    }

    async fn execute_batch(&mut self, batch: &str) -> Result<()> {
        let armed = self.bridge.arm();
        let submitted = self.session.submit(batch, armed.token()).await;
        if armed.retire().await == Retirement::Cancelled {
            log::debug!("[EXEC] Batch was interrupted");
        }

        let mut rs = match submitted {
            Ok(rs) => rs,
            Err(e) if e.is_engine_reported() => {
                log::debug!("[EXEC] Batch failed: {}", e);
                return Ok(());
            }
            Err(e) => {
                self.report(&e);
                return Ok(());
            }
        };

        self.consume_result_sets(&mut *rs).await
    }

    async fn consume_result_sets(&mut self, rs: &mut dyn ResultSet) -> Result<()> {
        loop {
            let columns = match rs.columns() {
                Some(columns) => columns.to_vec(),
                None => return Ok(()),
            };

            let mut table = TextTable::new(
                self.config.theme,
                self.config.column_separator.clone(),
                self.config.show_header,
            );
            let stats = render_rows(rs, &columns, &mut table, self.config.page_size, &mut *self.out)
                .await
                .map_err(output_error)?;
            log::debug!("[EXEC] Rendered {} rows in {} pages", stats.rows, stats.pages);
            if let Some(e) = stats.fetch_error {
                log::warn!("[EXEC] Row fetch failed after {} rows: {}", stats.rows, e);
            }

            if let Some(line) = Summary::of(rs).line() {
                writeln!(self.out, "{}", line).map_err(output_error)?;
            }
            self.out.flush().map_err(output_error)?;

            if !rs.has_next_result_set() {
                return Ok(());
            }
            rs.advance_to_next_result_set()
                .await
                .map_err(|e| CLIError::ResultSetError(e.to_string()))?;
            writeln!(self.out).map_err(output_error)?;
        }
    }

    fn report(&mut self, err: &dyn Display) {
        let line = format!("✗ {}", err).red();
        if writeln!(self.err, "{}", line).is_err() {
            log::error!("{}", err);
        }
    }
}
