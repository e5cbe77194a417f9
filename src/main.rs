//! Task API server.
//!
//! Serves a fixed task list as JSON on `PORT` (default 8000) and shuts down
//! gracefully on SIGINT, SIGQUIT or SIGTERM.

use std::process::ExitCode;

use tracing::instrument::WithSubscriber;

use todo_server::config::{self, Config, ConfigError, LoggingConfig};
use todo_server::lifecycle::{Lifecycle, LifecycleError, Shutdown, TerminationSignals};
use todo_server::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = config::from_env();
    let dispatch = match &config {
        Ok(config) => logging::build(&config.logging),
        Err(_) => logging::build(&LoggingConfig::default()),
    };

    let scoped = dispatch.clone();
    async move {
        match run(config, scoped).await {
            Ok(()) => {
                tracing::info!("Finished clean");
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %err, "Got error: {}", err);
                ExitCode::FAILURE
            }
        }
    }
    .with_subscriber(dispatch)
    .await
}

async fn run(
    config: Result<Config, ConfigError>,
    dispatch: tracing::Dispatch,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config?;

    tracing::info!(
        port = config.server.port,
        read_timeout = ?config.server.read_timeout,
        write_timeout = ?config.server.write_timeout,
        grace_timeout = ?config.server.grace_timeout,
        "Configuration loaded"
    );

    // Register before blocking so an early signal is not lost.
    let shutdown = Shutdown::new();
    TerminationSignals::install()
        .map_err(LifecycleError::Signals)?
        .forward_to(shutdown.clone());

    let lifecycle = Lifecycle::new(config.server, todo_server::http::app(), dispatch);
    let outcome = lifecycle.run(&shutdown).await?;

    tracing::info!(outcome = %outcome, "Shutdown complete");
    Ok(())
}
