//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection
//!     → server.rs (accept loop, middleware stack, drain)
//!     → net::connection (hyper HTTP/1.1 + HTTP/2)
//!     → handlers.rs (fixed JSON payload)
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use handlers::{json_response, list_todos, JSON_UTF8};
pub use server::{app, HttpServer};
