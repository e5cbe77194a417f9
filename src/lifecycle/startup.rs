//! Startup orchestration.
//!
//! # Responsibilities
//! - Spawn the server task
//! - Bind the listener and begin accepting traffic
//! - Report the task's outcome through a single-slot channel
//!
//! # Design Decisions
//! - Fail fast: any bind or accept error is fatal
//! - The result is sent with `try_send` on a capacity-1 channel, so the task
//!   never waits on a coordinator that has stopped listening

use axum::Router;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{LifecycleError, LifecycleState, StateCell};
use crate::net;

/// Handle to a running server task.
pub(crate) struct ServerHandle {
    /// The task running bind + accept loop.
    pub(crate) task: JoinHandle<()>,
    /// Receives the task's single outcome.
    pub(crate) results: mpsc::Receiver<Result<(), LifecycleError>>,
    /// Cancelled to make the server stop accepting and drain.
    pub(crate) drain: CancellationToken,
}

/// Spawn the server on its own task.
///
/// The task inherits the caller's logging dispatch.
pub(crate) fn spawn_server(config: &ServerConfig, router: Router, state: StateCell) -> ServerHandle {
    let (tx, results) = mpsc::channel(1);
    let drain = CancellationToken::new();

    let addr = config.bind_address();
    let server = HttpServer::new(config, router);
    let server_drain = drain.clone();

    let task = tokio::spawn(
        async move {
            let result = async {
                let listener = net::bind(addr).await?;
                let local_addr = listener.local_addr().ok();
                tracing::info!(address = ?local_addr, "API listening on {}", addr);
                state.advance(LifecycleState::Starting, LifecycleState::Serving);

                server.serve(listener, server_drain).await?;
                Ok::<(), LifecycleError>(())
            }
            .await;

            let _ = tx.try_send(result);
        }
        .with_current_subscriber(),
    );

    ServerHandle {
        task,
        results,
        drain,
    }
}
