//! Task API server library.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ net::listener ─▶ net::connection ─▶ http   │
//!                           │                                   handlers   │
//!     Client Response       │                                      │       │
//!     ◀─────────────────────┼──────────── JSON array ◀─────────────┘       │
//!                           │                                              │
//!                           │  lifecycle: startup ─▶ manager ─▶ shutdown   │
//!     SIGINT/SIGQUIT/SIGTERM┼─▶ signals ─▶ Shutdown token ─┘               │
//!                           │                                              │
//!                           │  config (PORT, RUST_LOG)   observability     │
//!                           └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod todos;

pub use config::Config;
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleState, Shutdown, ShutdownOutcome};
pub use todos::Todo;
