//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Classify accept errors: skip, back off, or stop serving

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The listener stopped producing connections.
    #[error("failed to accept: {0}")]
    Accept(#[source] io::Error),
}

/// Bind a TCP listener to `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenerError::Bind { addr, source })?;

    tracing::debug!(address = %local_addr, "Listener bound");
    Ok(listener)
}

/// What an accept error means for the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptFailure {
    /// Only the connection being accepted is affected; accept again.
    Connection,
    /// The process or system ran out of descriptors or buffers; back off.
    Exhausted,
    /// The listener itself is broken.
    Fatal,
}

impl AcceptFailure {
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock => AcceptFailure::Connection,
            io::ErrorKind::OutOfMemory => AcceptFailure::Exhausted,
            _ if is_exhaustion_errno(err) => AcceptFailure::Exhausted,
            _ => AcceptFailure::Fatal,
        }
    }
}

#[cfg(unix)]
fn is_exhaustion_errno(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::ENOMEM)
    )
}

#[cfg(not(unix))]
fn is_exhaustion_errno(_err: &io::Error) -> bool {
    false
}

/// Delay between accept attempts while descriptors are exhausted.
///
/// Starts at 5ms and doubles up to 1s; a successful accept resets it.
#[derive(Debug, Clone)]
pub struct AcceptBackoff {
    current: Option<Duration>,
}

impl AcceptBackoff {
    const FIRST: Duration = Duration::from_millis(5);
    const MAX: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self { current: None }
    }

    /// The delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let next = match self.current {
            None => Self::FIRST,
            Some(delay) => (delay * 2).min(Self::MAX),
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

impl Default for AcceptBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_reports_address_in_use() {
        let held = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = held.local_addr().unwrap();

        let err = bind(addr).await.unwrap_err();
        match err {
            ListenerError::Bind { addr: failed, ref source } => {
                assert_eq!(failed, addr);
                assert_eq!(source.kind(), io::ErrorKind::AddrInUse);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn per_connection_errors_are_skipped() {
        for kind in [io::ErrorKind::ConnectionAborted, io::ErrorKind::ConnectionReset] {
            assert_eq!(
                AcceptFailure::classify(&io::Error::from(kind)),
                AcceptFailure::Connection
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn descriptor_exhaustion_is_recoverable() {
        for errno in [libc::EMFILE, libc::ENFILE, libc::ENOBUFS, libc::ENOMEM] {
            let err = io::Error::from_raw_os_error(errno);
            assert_eq!(AcceptFailure::classify(&err), AcceptFailure::Exhausted, "{err}");
        }
    }

    #[test]
    fn other_errors_are_fatal() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(AcceptFailure::classify(&err), AcceptFailure::Fatal);
    }

    #[test]
    fn backoff_doubles_up_to_one_second() {
        let mut backoff = AcceptBackoff::new();
        assert_eq!(backoff.next_delay(), Duration::from_millis(5));
        assert_eq!(backoff.next_delay(), Duration::from_millis(10));
        assert_eq!(backoff.next_delay(), Duration::from_millis(20));

        for _ in 0..20 {
            backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(5));
    }
}
