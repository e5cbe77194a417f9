//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGQUIT, SIGTERM)
//! - Translate signals into a `Shutdown` trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered before anything blocks, so an early signal is
//!   queued rather than lost
//! - All three signals mean the same thing: graceful shutdown

use std::io;

use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;

use crate::lifecycle::Shutdown;

/// A signal that requests termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Quit,
    Terminate,
}

impl std::fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationSignal::Interrupt => write!(f, "SIGINT"),
            TerminationSignal::Quit => write!(f, "SIGQUIT"),
            TerminationSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Registered interest in termination signals.
#[derive(Debug)]
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    quit: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Register handlers. Must be called from within a Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            quit: signal(SignalKind::quit())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Register handlers. Must be called from within a Tokio runtime.
    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal.
    ///
    /// Returns `None` if signal delivery stopped.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Option<TerminationSignal> {
        tokio::select! {
            received = self.interrupt.recv() => received.map(|_| TerminationSignal::Interrupt),
            received = self.quit.recv() => received.map(|_| TerminationSignal::Quit),
            received = self.terminate.recv() => received.map(|_| TerminationSignal::Terminate),
        }
    }

    /// Wait for the next termination signal.
    ///
    /// Returns `None` if signal delivery stopped.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Option<TerminationSignal> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| TerminationSignal::Interrupt)
    }

    /// Trigger `shutdown` on the first termination signal.
    pub fn forward_to(mut self, shutdown: Shutdown) -> JoinHandle<()> {
        tokio::spawn(
            async move {
                match self.recv().await {
                    Some(signal) => {
                        tracing::info!(signal = %signal, "Shutdown signal received");
                        shutdown.trigger();
                    }
                    None => tracing::warn!("Signal stream closed"),
                }
            }
            .with_current_subscriber(),
        )
    }
}
