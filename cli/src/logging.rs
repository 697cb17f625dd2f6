// Logging setup, powered by tracing-subscriber.
//
// Library code logs through the `log` facade; `tracing_log::LogTracer`
// forwards those records into the subscriber installed here. Everything goes
// to stderr so it never mixes with result output.

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::{CLIError, Result};

/// Filter used when `RUST_LOG` is not set
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    // reqwest/hyper are chatty at debug
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn")
}

fn build_env_filter(verbose: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = default_directives(verbose);
    EnvFilter::try_new(&directives).map_err(|e| {
        CLIError::ConfigurationError(format!("Invalid log filter '{}': {}", directives, e))
    })
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_logging(verbose: bool) -> Result<()> {
    tracing_log::LogTracer::init().ok(); // ok() in case already initialized

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbose)
        .with_filter(build_env_filter(verbose)?);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .ok();

    tracing::trace!("Logging initialized: verbose={}", verbose);
    Ok(())
}
