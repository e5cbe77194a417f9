//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept error classification, backoff)
//!     → connection.rs (hyper connection, drain on shutdown)
//!     → axum Router
//!
//! Connection States:
//!     Active → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - Each connection runs on its own task, owned by the accept loop
//! - Draining lets the in-flight request finish, then closes
//! - Aborting the owning task set force-closes every connection

pub mod connection;
pub mod listener;

pub use connection::{serve_connection, ConnectionId, ScopedExecutor};
pub use listener::{bind, AcceptBackoff, AcceptFailure, ListenerError};
