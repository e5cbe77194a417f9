//! Shutdown coordination.
//!
//! `Shutdown` is the cancellation token the process boundary triggers;
//! `stop` turns a triggered token into a bounded drain of the server.

use std::time::Duration;

use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::lifecycle::startup::ServerHandle;
use crate::lifecycle::{LifecycleError, ShutdownOutcome};

/// Coordinator for graceful shutdown.
///
/// Cloneable handle around a cancellation token. Triggering is sticky, so a
/// waiter that starts after the trigger still observes it.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown is triggered.
    pub async fn recv(&self) {
        self.token.cancelled().await;
    }
}

/// Drain the server within `grace`, force-closing it if that fails.
pub(crate) async fn stop(
    server: ServerHandle,
    grace: Duration,
) -> Result<ShutdownOutcome, LifecycleError> {
    let ServerHandle {
        task,
        mut results,
        drain,
    } = server;

    // Asking listener to shutdown and shed load.
    drain.cancel();

    match time::timeout(grace, results.recv()).await {
        Ok(Some(Ok(()))) => {
            tracing::info!("Graceful shutdown complete");
            Ok(ShutdownOutcome::Terminated)
        }
        Ok(Some(Err(err))) => {
            tracing::warn!(error = %err, "Graceful shutdown failed");
            force_close(task).await
        }
        Ok(None) => {
            tracing::warn!("Server task ended without reporting a result");
            force_close(task).await
        }
        Err(_) => {
            tracing::warn!(
                timeout = ?grace,
                "Graceful shutdown did not complete in {:?}",
                grace
            );
            force_close(task).await
        }
    }
}

/// Abort the server task, dropping the listener and every connection.
async fn force_close(task: JoinHandle<()>) -> Result<ShutdownOutcome, LifecycleError> {
    task.abort();

    match task.await {
        Ok(()) => {}
        Err(err) if err.is_cancelled() => {}
        Err(err) => {
            tracing::error!(error = %err, "could not stop server gracefully");
            return Err(LifecycleError::ForceClose(err.to_string()));
        }
    }

    tracing::info!("Server force-closed");
    Ok(ShutdownOutcome::ForceClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(task: JoinHandle<()>) -> (ServerHandle, mpsc::Sender<Result<(), LifecycleError>>) {
        let (tx, results) = mpsc::channel(1);
        let server = ServerHandle {
            task,
            results,
            drain: CancellationToken::new(),
        };
        (server, tx)
    }

    #[tokio::test]
    async fn trigger_is_sticky() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());

        shutdown.clone().trigger();
        assert!(shutdown.is_triggered());
        time::timeout(Duration::from_secs(1), shutdown.recv())
            .await
            .expect("recv after trigger should complete");
    }

    #[tokio::test]
    async fn prompt_drain_terminates() {
        let (tx, results) = mpsc::channel(1);
        let drain = CancellationToken::new();
        let task_drain = drain.clone();
        let task = tokio::spawn(async move {
            task_drain.cancelled().await;
            let _ = tx.try_send(Ok(()));
        });
        let server = ServerHandle { task, results, drain };

        let outcome = stop(server, Duration::from_secs(5)).await.unwrap();
        assert_eq!(outcome, ShutdownOutcome::Terminated);
    }

    #[tokio::test]
    async fn stuck_drain_is_force_closed() {
        let task = tokio::spawn(std::future::pending::<()>());
        let (server, _tx) = handle(task);

        let outcome = stop(server, Duration::from_millis(50)).await.unwrap();
        assert_eq!(outcome, ShutdownOutcome::ForceClosed);
    }

    #[tokio::test]
    async fn drain_error_is_force_closed() {
        let task = tokio::spawn(std::future::pending::<()>());
        let (server, tx) = handle(task);
        tx.try_send(Err(LifecycleError::ServerExited)).unwrap();

        let outcome = stop(server, Duration::from_secs(5)).await.unwrap();
        assert_eq!(outcome, ShutdownOutcome::ForceClosed);
    }

    #[tokio::test]
    async fn panicked_server_fails_force_close() {
        let task = tokio::spawn(async { panic!("server blew up") });
        let (server, tx) = handle(task);
        drop(tx);

        let err = stop(server, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, LifecycleError::ForceClose(_)));
    }
}
