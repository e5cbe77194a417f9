//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Spawn server task → Bind → Serve
//!     (bind/serve failure → single-slot result channel)
//!
//! Signals (signals.rs):
//!     SIGINT/SIGQUIT/SIGTERM → Shutdown::trigger
//!
//! Manager (manager.rs):
//!     select { result channel → Failed, Shutdown → shutdown.rs }
//!
//! Shutdown (shutdown.rs):
//!     Drain (bounded by grace timeout) → else force-close
//! ```
//!
//! # State Machine
//! ```text
//! Starting → Serving → { Failed | ShuttingDown } → { Terminated | ForceClosed } → Done
//! ```
//!
//! # Design Decisions
//! - Bind failure is fatal and skips the grace period
//! - Shutdown has timeout: forced close after deadline
//! - Signals are adapted into a cancellation token at the process boundary

pub mod manager;
pub mod shutdown;
pub mod signals;
pub mod startup;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::net::ListenerError;

pub use manager::Lifecycle;
pub use shutdown::Shutdown;
pub use signals::{TerminationSignal, TerminationSignals};

/// Errors that end a lifecycle run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The listener could not be bound or stopped accepting.
    #[error("listening and serving: {0}")]
    Listener(#[from] ListenerError),

    /// The server task ended without an error and without being asked to.
    #[error("server exited unexpectedly")]
    ServerExited,

    /// Force-closing the server after a failed drain did not succeed.
    #[error("could not stop server: {0}")]
    ForceClose(String),

    /// Termination signal handlers could not be registered.
    #[error("installing signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}

/// How a shutdown completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every connection drained within the grace timeout.
    Terminated,
    /// The grace timeout expired or draining failed; connections were aborted.
    ForceClosed,
}

impl std::fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownOutcome::Terminated => write!(f, "terminated"),
            ShutdownOutcome::ForceClosed => write!(f, "force-closed"),
        }
    }
}

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Serving,
    Failed,
    ShuttingDown,
    Terminated,
    ForceClosed,
    Done,
}

impl LifecycleState {
    /// Whether the run is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Done | LifecycleState::Failed)
    }
}

impl From<ShutdownOutcome> for LifecycleState {
    fn from(outcome: ShutdownOutcome) -> Self {
        match outcome {
            ShutdownOutcome::Terminated => LifecycleState::Terminated,
            ShutdownOutcome::ForceClosed => LifecycleState::ForceClosed,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Serving => "serving",
            LifecycleState::Failed => "failed",
            LifecycleState::ShuttingDown => "shutting-down",
            LifecycleState::Terminated => "terminated",
            LifecycleState::ForceClosed => "force-closed",
            LifecycleState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Shared, observable lifecycle state.
#[derive(Debug, Clone)]
pub(crate) struct StateCell {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn set(&self, next: LifecycleState) {
        let previous = self.tx.send_replace(next);
        tracing::debug!(from = %previous, to = %next, "Lifecycle transition");
    }

    /// Move to `next` only if currently in `from`.
    pub(crate) fn advance(&self, from: LifecycleState, next: LifecycleState) -> bool {
        let advanced = self.tx.send_if_modified(|current| {
            if *current == from {
                *current = next;
                true
            } else {
                false
            }
        });
        if advanced {
            tracing::debug!(from = %from, to = %next, "Lifecycle transition");
        }
        advanced
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }
}
