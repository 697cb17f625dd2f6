//! bsql - batch-oriented SQL terminal
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! bsql -S http://localhost:8080 -D pubs2
//!
//! # Run a script, echoing each line, results to a file
//! bsql -i setup.sql -e -o setup.out
//!
//! # Custom terminator
//! bsql -c '\\g' -i queries.sql
//! ```

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use bsql_cli::history::default_history_path;
use bsql_cli::logging::init_logging;
use bsql_cli::{
    BatchSource, CLIConfiguration, CLIError, ExecutionLoop, InteractiveSource, Result,
    RunConfig, RustylineEditor, ScriptedSource,
};

mod args;
mod connect;

use args::Cli;
use connect::{build_run_config, create_session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color || !io::stderr().is_terminal() {
        colored::control::set_override(false);
    }
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{}", format!("✗ {}", e).red());
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("✗ {}", e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CLIConfiguration::load(&cli.config)?;
    let run_config = build_run_config(&cli, &config)?;

    let mut source = open_source(&cli, &config, &run_config)?;
    let output = open_output(cli.output.as_deref())?;

    let session = create_session(&cli, &config).await?;
    let mut executor = ExecutionLoop::new(Box::new(session), run_config).with_output(output);
    executor.run(source.as_mut()).await
}

fn open_source(
    cli: &Cli,
    config: &CLIConfiguration,
    run_config: &RunConfig,
) -> Result<Box<dyn BatchSource>> {
    let terminator = run_config.terminator.clone();

    if let Some(path) = &cli.input {
        let source = ScriptedSource::open(path, terminator)?.with_echo(run_config.echo);
        return Ok(Box::new(source));
    }

    if !io::stdin().is_terminal() {
        log::debug!("[INPUT] stdin is not a terminal, reading it as a script");
        let source = ScriptedSource::new(io::stdin().lock(), terminator).with_echo(run_config.echo);
        return Ok(Box::new(source));
    }

    let history_path = cli.history_file.clone().unwrap_or_else(default_history_path);
    let editor = RustylineEditor::new(history_path, config.resolved_ui().history_size)?;
    Ok(Box::new(InteractiveSource::new(editor, terminator)))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                CLIError::FileError(format!(
                    "cannot open output file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
