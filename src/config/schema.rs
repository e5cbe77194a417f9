//! Configuration schema definitions.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port used when `PORT` is unset or empty.
pub const DEFAULT_PORT: u16 = 8000;

/// Upper bound on reading a request's headers.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on producing a response once the request has been read.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Time allotted to in-flight requests once shutdown starts.
pub const GRACE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default `EnvFilter` directives when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "todo_server=info,tower_http=info";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Listener settings.
    pub server: ServerConfig,

    /// Log filter settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port to listen on, on all interfaces.
    pub port: u16,

    /// Header read timeout per request.
    pub read_timeout: Duration,

    /// Handler/response timeout per request.
    pub write_timeout: Duration,

    /// Bound on graceful shutdown before connections are force-closed.
    pub grace_timeout: Duration,
}

impl ServerConfig {
    /// Config listening on `port` with the standard timeouts.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            grace_timeout: GRACE_TIMEOUT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
