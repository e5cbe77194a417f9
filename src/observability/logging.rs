//! Structured logging.
//!
//! # Responsibilities
//! - Build the subscriber stack (filter + formatter)
//! - Hand it out as a `Dispatch` the caller scopes explicitly
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`
//! - Invalid filter directives fall back to the default filter

use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::config::schema::{LoggingConfig, DEFAULT_LOG_FILTER};

/// Build the logging handle for the process.
///
/// Events go to stdout with timestamp, level, and source location.
pub fn build(config: &LoggingConfig) -> Dispatch {
    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_file(true)
            .with_line_number(true),
    );

    Dispatch::new(subscriber)
}
