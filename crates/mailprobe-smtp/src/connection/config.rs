//! Connection configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound for TCP connect and TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default bound for each read and write.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);
/// Default name announced in EHLO.
pub const DEFAULT_CLIENT_HOSTNAME: &str = "localhost";

/// Connection encryption mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionMode {
    /// No encryption (port 25). **Not recommended.**
    None,
    /// TLS from the first byte (port 465).
    #[serde(alias = "ssl", alias = "smtps")]
    ImplicitTls,
    /// Start with plaintext, upgrade with STARTTLS (port 587).
    #[default]
    #[serde(alias = "starttls", alias = "tls")]
    StartTls,
}

impl EncryptionMode {
    /// Returns the default port for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::ImplicitTls => 465,
            Self::StartTls => 587,
        }
    }
}

/// SMTP session configuration. Immutable once handed to the engine.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server hostname (also used for certificate verification).
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Encryption mode.
    pub encryption: EncryptionMode,
    /// Bound for TCP connect and TLS handshake.
    pub connect_timeout: Duration,
    /// Bound for each read and write.
    pub io_timeout: Duration,
    /// Name announced in EHLO.
    pub client_hostname: String,
}

impl SessionConfig {
    /// Creates a configuration using STARTTLS on port 587.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::builder(host).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> SessionConfigBuilder {
        SessionConfigBuilder::new(host)
    }

    /// Returns `host:port` for connecting.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    host: String,
    port: Option<u16>,
    encryption: EncryptionMode,
    connect_timeout: Duration,
    io_timeout: Duration,
    client_hostname: String,
}

impl SessionConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            encryption: EncryptionMode::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
            client_hostname: DEFAULT_CLIENT_HOSTNAME.to_string(),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the encryption mode.
    #[must_use]
    pub const fn encryption(mut self, encryption: EncryptionMode) -> Self {
        self.encryption = encryption;
        self
    }

    /// Sets the connect/handshake timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Sets the name announced in EHLO.
    #[must_use]
    pub fn client_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.client_hostname = hostname.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        SessionConfig {
            host: self.host,
            port: self
                .port
                .unwrap_or_else(|| self.encryption.default_port()),
            encryption: self.encryption,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
            client_hostname: self.client_hostname,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(EncryptionMode::None.default_port(), 25);
        assert_eq!(EncryptionMode::ImplicitTls.default_port(), 465);
        assert_eq!(EncryptionMode::StartTls.default_port(), 587);
    }

    #[test]
    fn test_config_new() {
        let config = SessionConfig::new("smtp.example.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.encryption, EncryptionMode::StartTls);
        assert_eq!(config.client_hostname, "localhost");
        assert_eq!(config.address(), "smtp.example.com:587");
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::builder("smtp.example.com")
            .encryption(EncryptionMode::ImplicitTls)
            .connect_timeout(Duration::from_secs(3))
            .io_timeout(Duration::from_secs(5))
            .client_hostname("probe.example.com")
            .build();

        assert_eq!(config.port, 465);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.io_timeout, Duration::from_secs(5));
        assert_eq!(config.client_hostname, "probe.example.com");
    }

    #[test]
    fn test_explicit_port_wins() {
        let config = SessionConfig::builder("smtp.example.com")
            .encryption(EncryptionMode::None)
            .port(2525)
            .build();
        assert_eq!(config.port, 2525);
    }
}
