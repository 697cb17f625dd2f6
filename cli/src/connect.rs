use std::time::Duration;

use bsql_cli::config::{RunConfigBuilder, DEFAULT_DATABASE, DEFAULT_SERVER_URL};
use bsql_cli::notice::stdout_handler;
use bsql_cli::{CLIConfiguration, EchoMode, LinkSession, Result, RunConfig, Session};
use bsql_link::LinkClient;

use crate::args::Cli;

/// Merge config-file values with command-line overrides
pub fn build_run_config(cli: &Cli, config: &CLIConfiguration) -> Result<RunConfig> {
    let mut builder = RunConfigBuilder::from_ui(&config.resolved_ui())
        .echo(EchoMode::from_flags(cli.echo, cli.no_prompt))
        .show_header(!cli.no_header);

    if let Some(terminator) = &cli.terminator {
        builder = builder.terminator(terminator.clone());
    }
    if let Some(page_size) = cli.page_size {
        builder = builder.page_size(page_size);
    }
    if let Some(separator) = &cli.separator {
        builder = builder.column_separator(separator.clone());
    }
    if let Some(theme) = &cli.theme {
        builder = builder.theme(theme.clone());
    }

    builder.build()
}

/// Connect to the server and install the diagnostic printer
pub async fn create_session(cli: &Cli, config: &CLIConfiguration) -> Result<LinkSession> {
    let server = config.resolved_server();

    let url = cli
        .server
        .clone()
        .or(server.url)
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let database = cli
        .database
        .clone()
        .or(server.database)
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
    let timeout = cli.timeout.unwrap_or(server.timeout);
    let login_timeout = cli.login_timeout.unwrap_or(server.login_timeout);

    let mut builder = LinkClient::builder()
        .base_url(url)
        .database(database)
        .timeout((timeout > 0).then(|| Duration::from_secs(timeout)));
    if login_timeout > 0 {
        builder = builder.connect_timeout(Duration::from_secs(login_timeout));
    }
    let client = builder.build()?;

    log::debug!("[CONNECT] Connecting to {}", client.base_url());
    let mut session = LinkSession::connect(client).await?;
    session.set_diagnostic_handler(stdout_handler());
    Ok(session)
}
