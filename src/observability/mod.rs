//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! LoggingConfig
//!     → logging.rs (build subscriber stack)
//!     → tracing::Dispatch (explicit handle)
//!     → attached to the lifecycle and every task it spawns
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event, human-readable output on stdout
//! - No process-global subscriber; the dispatch is passed where it is used
//! - Per-request spans come from tower-http's TraceLayer

pub mod logging;
