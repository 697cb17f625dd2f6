use clap::Parser;
use std::path::PathBuf;

use bsql_cli::config::DEFAULT_CONFIG_PATH;

macro_rules! version_string {
    () => {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nCommit: ",
            env!("GIT_COMMIT_HASH"),
            " (",
            env!("GIT_BRANCH"),
            ")\nBuilt: ",
            env!("BUILD_DATE")
        )
    };
}

/// bsql - batch-oriented SQL terminal
///
/// Reads SQL from the terminal or a script, groups lines into batches ended
/// by the terminator, and prints every result set as a text table.
#[derive(Parser, Debug)]
#[command(name = "bsql")]
#[command(version = version_string!())]
#[command(about = "Batch-oriented SQL terminal", long_about = None)]
pub struct Cli {
    /// Regex marking the end of a batch (default ";|^go")
    #[arg(short = 'c', long = "terminator", value_name = "REGEX")]
    pub terminator: Option<String>,

    /// Rows per table page (default 3000)
    #[arg(short = 'p', long = "page-size", value_name = "ROWS")]
    pub page_size: Option<usize>,

    /// Column separator (default " ")
    #[arg(short = 's', long = "separator", value_name = "TEXT")]
    pub separator: Option<String>,

    /// Print input lines before execution
    #[arg(short = 'e', long = "echo")]
    pub echo: bool,

    /// Do not prefix echoed lines with their line number
    #[arg(short = 'n', long = "no-prompt")]
    pub no_prompt: bool,

    /// Disable column headers
    #[arg(short = 'b', long = "no-header")]
    pub no_header: bool,

    /// Display theme: ASCIICompact or UtfCompact
    #[arg(short = 'T', long = "theme")]
    pub theme: Option<String>,

    /// Read batches from this file instead of the terminal
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write results to this file (truncated or created)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Server URL (default http://localhost:8080)
    #[arg(short = 'S', long = "server", value_name = "URL")]
    pub server: Option<String>,

    /// Database to use (default master)
    #[arg(short = 'D', long = "database")]
    pub database: Option<String>,

    /// Command timeout in seconds, 0 for none
    #[arg(short = 't', long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Login timeout in seconds, 0 for the client default
    #[arg(short = 'l', long = "login-timeout", value_name = "SECONDS")]
    pub login_timeout: Option<u64>,

    /// Configuration file path
    #[arg(long = "config", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// History file path (default ~/.bsql_history)
    #[arg(long = "history-file", value_name = "FILE")]
    pub history_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "bsql", "-c", "/", "-p", "10", "-s", "|", "-e", "-n", "-b", "-T", "ASCIICompact",
            "-i", "in.sql", "-o", "out.txt", "-S", "http://db:9000", "-D", "pubs2", "-t", "30",
            "-l", "5",
        ])
        .unwrap();
        assert_eq!(cli.terminator.as_deref(), Some("/"));
        assert_eq!(cli.page_size, Some(10));
        assert_eq!(cli.separator.as_deref(), Some("|"));
        assert!(cli.echo && cli.no_prompt && cli.no_header);
        assert_eq!(cli.theme.as_deref(), Some("ASCIICompact"));
        assert_eq!(cli.input, Some(PathBuf::from("in.sql")));
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.server.as_deref(), Some("http://db:9000"));
        assert_eq!(cli.database.as_deref(), Some("pubs2"));
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.login_timeout, Some(5));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["bsql"]).unwrap();
        assert!(cli.input.is_none());
        assert!(!cli.echo);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }
}
