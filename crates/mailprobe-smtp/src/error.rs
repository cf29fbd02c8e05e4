//! Error types for SMTP operations.

use std::io;
use std::time::Duration;

use crate::engine::Step;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while performing the named operation.
    #[error("{operation} failed: {source}")]
    Io {
        /// Operation in progress (e.g., `connect`, `read reply`).
        operation: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Operation did not complete within its bound.
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        /// Operation in progress.
        operation: &'static str,
        /// Configured bound.
        after: Duration,
    },

    /// TLS handshake or certificate failure.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Hostname cannot be used for certificate verification.
    #[error("Invalid hostname for TLS: {0}")]
    InvalidHostname(String),

    /// Server sent something that is not a valid SMTP reply.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Server answered a step with a code outside the accepted set.
    #[error("Unexpected reply to {step}: {code} {message}")]
    UnexpectedReply {
        /// Step that was being performed.
        step: Step,
        /// Reply code received.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// Feature not advertised by the server.
    #[error("Server does not support {0}")]
    NotSupported(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Message exceeds the size the server advertised.
    #[error("Message of {size} bytes exceeds server limit of {limit} bytes")]
    MessageTooLarge {
        /// Composed message size.
        size: usize,
        /// Advertised `SIZE` limit.
        limit: usize,
    },

    /// Peer closed the connection mid-exchange.
    #[error("Connection closed by server during {operation}")]
    ConnectionClosed {
        /// Operation in progress.
        operation: &'static str,
    },

    /// Session was used after being closed.
    #[error("Session already closed")]
    SessionClosed,
}

impl Error {
    /// Wraps an I/O error with the operation that produced it.
    #[must_use]
    pub const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }

}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_operation() {
        let err = Error::io(
            "connect",
            io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"),
        );
        assert_eq!(err.to_string(), "connect failed: Connection refused");
    }

    #[test]
    fn timeout_display() {
        let err = Error::Timeout {
            operation: "read reply",
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "read reply timed out after 1500ms");
    }

    #[test]
    fn connection_closed_names_operation() {
        let err = Error::ConnectionClosed {
            operation: "read reply",
        };
        assert_eq!(
            err.to_string(),
            "Connection closed by server during read reply"
        );
    }

    #[test]
    fn unexpected_reply_names_step() {
        let err = Error::UnexpectedReply {
            step: Step::AuthPassword,
            code: 535,
            message: "bad credentials".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected reply to AUTH password: 535 bad credentials"
        );
    }
}
