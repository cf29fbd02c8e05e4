//! TLS upgrade of an established stream.

use std::future::Future;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

use super::stream::BoxedStream;
use crate::error::{Error, Result};

/// Wraps an existing stream in an encrypted one.
///
/// Used for both implicit TLS (right after connect) and STARTTLS (after the
/// server's 220 go-ahead). The handshake runs on the same socket; no new
/// connection is opened.
pub trait Upgrader: Send + Sync {
    /// Performs the handshake and returns the encrypted stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHostname`] if `hostname` cannot be verified
    /// against, or [`Error::Tls`] if the handshake fails.
    fn upgrade(
        &self,
        stream: BoxedStream,
        hostname: &str,
    ) -> impl Future<Output = Result<BoxedStream>> + Send;
}

/// rustls-backed upgrader verifying against the Mozilla root set.
#[derive(Clone)]
pub struct RustlsUpgrader {
    connector: TlsConnector,
}

impl RustlsUpgrader {
    /// Creates an upgrader with the bundled web PKI roots.
    #[must_use]
    pub fn new() -> Self {
        let root_store = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self::with_config(Arc::new(config))
    }

    /// Creates an upgrader from a caller-supplied client config
    /// (private CAs, test roots).
    #[must_use]
    pub fn with_config(config: Arc<ClientConfig>) -> Self {
        Self {
            connector: TlsConnector::from(config),
        }
    }
}

impl Default for RustlsUpgrader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RustlsUpgrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustlsUpgrader").finish_non_exhaustive()
    }
}

impl Upgrader for RustlsUpgrader {
    async fn upgrade(&self, stream: BoxedStream, hostname: &str) -> Result<BoxedStream> {
        let server_name = ServerName::try_from(hostname.to_string())
            .map_err(|_| Error::InvalidHostname(hostname.to_string()))?;

        let tls = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| Error::Tls(e.to_string()))?;

        Ok(Box::new(tls))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unusable_hostname() {
        let (client, _server) = tokio::io::duplex(64);
        let upgrader = RustlsUpgrader::new();
        let err = upgrader
            .upgrade(Box::new(client), "not a hostname")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidHostname(_)));
    }

    #[tokio::test]
    async fn handshake_failure_is_tls_error() {
        let (client, server) = tokio::io::duplex(1024);
        // Peer hangs up before answering the ClientHello.
        drop(server);
        let err = RustlsUpgrader::new()
            .upgrade(Box::new(client), "smtp.example.com")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Tls(_)));
    }
}
