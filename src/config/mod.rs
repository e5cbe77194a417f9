//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, RUST_LOG)
//!     → loader.rs (lookup & parse)
//!     → Config (immutable)
//!     → ServerConfig handed to the lifecycle, LoggingConfig to observability
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated
//! - Every field has a default so an empty environment is valid
//! - Timeouts are fixed; only the port is operator-facing

pub mod loader;
pub mod schema;

pub use loader::{from_env, from_lookup, ConfigError};
pub use schema::{Config, LoggingConfig, ServerConfig};
