//! Configuration loading from the process environment.

use std::num::ParseIntError;

use thiserror::Error;

use crate::config::schema::{Config, LoggingConfig, ServerConfig, DEFAULT_PORT};

/// Environment variable holding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable holding log filter directives.
pub const LOG_VAR: &str = "RUST_LOG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PORT` is set but is not a valid TCP port.
    #[error("invalid PORT value {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Load configuration from the process environment.
pub fn from_env() -> Result<Config, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup.
///
/// Unset and empty variables both fall back to their defaults.
pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match non_empty(lookup(PORT_VAR)) {
        Some(value) => value
            .parse::<u16>()
            .map_err(|source| ConfigError::InvalidPort { value, source })?,
        None => DEFAULT_PORT,
    };

    let logging = match non_empty(lookup(LOG_VAR)) {
        Some(filter) => LoggingConfig { filter },
        None => LoggingConfig::default(),
    };

    Ok(Config {
        server: ServerConfig::with_port(port),
        logging,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
