//! HTTP server setup and accept loop.
//!
//! # Responsibilities
//! - Create the Axum Router for the API
//! - Wire up middleware (timeout, request ID, tracing)
//! - Configure HTTP/1.1 and HTTP/2 support with a header read timeout
//! - Accept connections until told to drain, then wait for them to close

use axum::{routing::any, Router};
use hyper_util::{rt::TokioTimer, server::conn::auto::Builder};
use tokio::{net::TcpListener, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::instrument::WithSubscriber;

use crate::config::ServerConfig;
use crate::http::handlers::list_todos;
use crate::net::{self, AcceptBackoff, AcceptFailure, ListenerError, ScopedExecutor};

/// Routes of the API: every method on every path lists the tasks.
pub fn app() -> Router {
    Router::new()
        .route("/{*path}", any(list_todos))
        .route("/", any(list_todos))
}

/// HTTP server for the task API.
pub struct HttpServer {
    router: Router,
    builder: Builder<ScopedExecutor>,
}

impl HttpServer {
    /// Create a server around `router`, adding the standard middleware.
    pub fn new(config: &ServerConfig, router: Router) -> Self {
        let mut builder = Builder::new(ScopedExecutor);
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(config.read_timeout);
        builder.http2().timer(TokioTimer::new());

        Self {
            router: Self::apply_layers(config, router),
            builder,
        }
    }

    /// Wrap the router with all middleware layers.
    #[allow(deprecated)]
    fn apply_layers(config: &ServerConfig, router: Router) -> Router {
        router
            .layer(TimeoutLayer::new(config.write_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Accept connections on `listener` until `drain` fires.
    ///
    /// After `drain` the listener is closed, every open connection is asked to
    /// finish its in-flight request, and this returns once all have closed.
    /// Running out of descriptors pauses accepting with a growing delay
    /// rather than ending the loop. Dropping the returned future aborts every
    /// connection instead.
    pub async fn serve(
        self,
        listener: TcpListener,
        drain: CancellationToken,
    ) -> Result<(), ListenerError> {
        let mut connections = JoinSet::new();
        let mut backoff = AcceptBackoff::new();

        loop {
            tokio::select! {
                biased;

                _ = drain.cancelled() => break,

                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        backoff.reset();
                        connections.spawn(
                            net::serve_connection(
                                stream,
                                peer,
                                self.router.clone(),
                                self.builder.clone(),
                                drain.clone(),
                            )
                            .with_current_subscriber(),
                        );
                    }
                    Err(err) => match AcceptFailure::classify(&err) {
                        AcceptFailure::Connection => {
                            tracing::debug!(error = %err, "Accept failed, continuing");
                        }
                        AcceptFailure::Exhausted => {
                            let delay = backoff.next_delay();
                            tracing::warn!(error = %err, retry_in = ?delay, "Accept failed, backing off");
                            tokio::select! {
                                biased;
                                _ = drain.cancelled() => break,
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }
                        AcceptFailure::Fatal => return Err(ListenerError::Accept(err)),
                    },
                },

                Some(joined) = connections.join_next() => log_join(joined),
            }
        }

        drop(listener);
        tracing::info!(
            open_connections = connections.len(),
            "Stopped accepting, draining connections"
        );

        while let Some(joined) = connections.join_next().await {
            log_join(joined);
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        if err.is_panic() {
            tracing::error!(error = %err, "Connection task panicked");
        }
    }
}
