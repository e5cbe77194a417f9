//! Per-connection serving and lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Drive one hyper connection through the router
//! - Switch the connection to graceful shutdown when draining starts

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use hyper::{body::Incoming, Request};
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::instrument::WithSubscriber;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Log label of an accepted connection, shown as `conn-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Executor for hyper's background tasks (HTTP/2 streams).
///
/// Spawned futures keep the logging dispatch of the connection that spawned
/// them, so per-request spans of HTTP/2 streams reach the same sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedExecutor;

impl<F> hyper::rt::Executor<F> for ScopedExecutor
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        tokio::spawn(fut.with_current_subscriber());
    }
}

/// Serve a single accepted connection until it closes.
///
/// Once `drain` fires the connection finishes its in-flight request and
/// closes instead of waiting for the next one. Errors (including a client
/// hanging up mid-response) are logged and otherwise dropped: the status line
/// has already been sent by then.
pub async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    builder: Builder<ScopedExecutor>,
    drain: CancellationToken,
) {
    let id = ConnectionId::next();
    tracing::debug!(connection_id = %id, peer = %peer, "Connection accepted");

    let service = hyper::service::service_fn(move |request: Request<Incoming>| {
        router.clone().oneshot(request)
    });

    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(err) = result {
                    tracing::warn!(
                        connection_id = %id,
                        peer = %peer,
                        error = %err,
                        "Connection closed with error"
                    );
                }
                break;
            }
            _ = drain.cancelled(), if !draining => {
                tracing::debug!(connection_id = %id, "Draining connection");
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }

    tracing::debug!(connection_id = %id, "Connection closed");
}
