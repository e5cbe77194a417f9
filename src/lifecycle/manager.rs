//! Listener lifecycle manager.
//!
//! Runs the server on a background task and blocks on whichever comes
//! first: the server failing, or a shutdown request.

use axum::Router;
use tokio::sync::watch;
use tracing::{instrument::WithSubscriber, Dispatch};

use crate::config::ServerConfig;
use crate::lifecycle::shutdown::stop;
use crate::lifecycle::{startup, LifecycleError, LifecycleState, Shutdown, ShutdownOutcome, StateCell};

/// Owns the listener's start, serve, and stop sequence.
pub struct Lifecycle {
    config: ServerConfig,
    router: Router,
    dispatch: Dispatch,
    state: StateCell,
}

impl Lifecycle {
    /// Create a lifecycle for `router`.
    ///
    /// Every event the lifecycle and its tasks emit goes to `dispatch`.
    pub fn new(config: ServerConfig, router: Router, dispatch: Dispatch) -> Self {
        Self {
            config,
            router,
            dispatch,
            state: StateCell::new(),
        }
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serve until `shutdown` fires or the listener fails.
    ///
    /// A listener failure is returned immediately with no grace period. A
    /// shutdown drains in-flight requests for up to the grace timeout, then
    /// force-closes whatever is left.
    pub async fn run(self, shutdown: &Shutdown) -> Result<ShutdownOutcome, LifecycleError> {
        let dispatch = self.dispatch.clone();
        async move {
            tracing::info!(port = self.config.port, "Listening on :{}", self.config.port);
            let result = self.serve_until_shutdown(shutdown).await;
            tracing::info!("Completed");
            result
        }
        .with_subscriber(dispatch)
        .await
    }

    async fn serve_until_shutdown(
        self,
        shutdown: &Shutdown,
    ) -> Result<ShutdownOutcome, LifecycleError> {
        let Lifecycle {
            config,
            router,
            state,
            ..
        } = self;

        let mut server = startup::spawn_server(&config, router, state.clone());

        // Blocking main and waiting for shutdown.
        tokio::select! {
            result = server.results.recv() => {
                state.set(LifecycleState::Failed);
                let err = match result {
                    Some(Err(err)) => err,
                    Some(Ok(())) | None => LifecycleError::ServerExited,
                };
                tracing::error!(error = %err, "Listening and serving failed");
                Err(err)
            }

            _ = shutdown.recv() => {
                state.set(LifecycleState::ShuttingDown);
                tracing::info!(grace_timeout = ?config.grace_timeout, "Start shutdown");

                match stop(server, config.grace_timeout).await {
                    Ok(outcome) => {
                        state.set(outcome.into());
                        state.set(LifecycleState::Done);
                        Ok(outcome)
                    }
                    Err(err) => {
                        state.set(LifecycleState::Failed);
                        Err(err)
                    }
                }
            }
        }
    }
}
