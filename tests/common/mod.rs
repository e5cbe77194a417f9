//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use todo_server::config::ServerConfig;
use todo_server::{Lifecycle, LifecycleError, LifecycleState, Shutdown, ShutdownOutcome};
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;

/// Log sink that keeps everything written to it.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A logging handle that records into the returned buffer.
pub fn capture_logs() -> (Dispatch, LogBuffer) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (Dispatch::new(subscriber), logs)
}

/// A port nothing is listening on right now.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// HTTP client that never reuses pooled connections across tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A lifecycle running on a background task.
pub struct Running {
    pub port: u16,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<LifecycleState>,
    pub logs: LogBuffer,
    pub task: JoinHandle<Result<ShutdownOutcome, LifecycleError>>,
}

impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Trigger shutdown and wait for the run to finish.
    pub async fn stop(mut self) -> (Result<ShutdownOutcome, LifecycleError>, LogBuffer) {
        self.shutdown.trigger();
        settled(&mut self.state).await;
        let result = tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("lifecycle did not stop")
            .expect("lifecycle task panicked");
        (result, self.logs)
    }
}

/// Wait until the run has reached `Done` or `Failed`.
pub async fn settled(state: &mut watch::Receiver<LifecycleState>) -> LifecycleState {
    *tokio::time::timeout(Duration::from_secs(10), state.wait_for(LifecycleState::is_terminal))
        .await
        .expect("lifecycle never settled")
        .expect("lifecycle dropped")
}

/// Start `router` on a free port and wait until it is serving.
pub async fn start(router: Router, grace: Duration) -> Running {
    start_with(router, |config| config.grace_timeout = grace).await
}

/// Like `start`, with the server config adjusted by `configure`.
pub async fn start_with<F>(router: Router, configure: F) -> Running
where
    F: FnOnce(&mut ServerConfig),
{
    let port = free_port();
    let mut config = ServerConfig::with_port(port);
    configure(&mut config);
    config.port = port;

    let (dispatch, logs) = capture_logs();
    let lifecycle = Lifecycle::new(config, router, dispatch);
    let mut state = lifecycle.state();
    let shutdown = Shutdown::new();

    let run_shutdown = shutdown.clone();
    let task = tokio::spawn(async move { lifecycle.run(&run_shutdown).await });

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == LifecycleState::Serving),
    )
    .await
    .expect("server did not start")
    .expect("lifecycle dropped");

    Running {
        port,
        shutdown,
        state,
        logs,
        task,
    }
}
