//! Transport error classification.
//!
//! Failures are matched by kind, never by formatted message text. The
//! scheduler treats `WouldBlock` and `Timeout` identically (re-loop in
//! silence); everything else is logged and survived.

use std::io;
use thiserror::Error;

/// A transport failure, classified.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The operation would have blocked.
    #[error("operation would block")]
    WouldBlock,

    /// The operation exceeded its bounded wait.
    #[error("operation timed out")]
    Timeout,

    /// The peer refused, reset, or dropped the connection.
    #[error("connection failed: {0}")]
    ConnectionFailed(io::Error),

    /// Anything else the transport reported.
    #[error("transport error: {0}")]
    Other(io::Error),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock => TransportError::WouldBlock,
            io::ErrorKind::TimedOut => TransportError::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected => TransportError::ConnectionFailed(err),
            _ => TransportError::Other(err),
        }
    }
}

impl TransportError {
    /// Whether this is one of the quiet "nothing happened" results an
    /// accept wait produces on an idle server.
    pub fn is_idle(&self) -> bool {
        matches!(self, TransportError::WouldBlock | TransportError::Timeout)
    }
}
