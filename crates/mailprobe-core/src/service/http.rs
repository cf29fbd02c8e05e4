//! Boundary to the application's HTTP mail API.
//!
//! Used when no relay is enabled. The API has its own sender and
//! credentials, so only the recipient and content cross this boundary.

use std::future::Future;

/// Failure reported by the HTTP mail API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HttpTransportError(pub String);

impl HttpTransportError {
    /// Creates an error from any message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A message handed to the HTTP mail API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage {
    /// Recipient address, as entered.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Sends a message through the application's HTTP mail API.
pub trait HttpMailTransport: Send + Sync {
    /// Delivers `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API did not accept the message.
    fn send(
        &self,
        message: &HttpMessage,
    ) -> impl Future<Output = Result<(), HttpTransportError>> + Send;
}
