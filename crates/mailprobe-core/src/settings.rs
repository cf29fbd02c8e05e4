//! Relay settings as supplied by the surrounding application.

use std::time::Duration;

use mailprobe_smtp::connection::{
    DEFAULT_CLIENT_HOSTNAME, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT,
};
use mailprobe_smtp::{Address, Credentials, EncryptionMode, Mailbox, SessionConfig};
use serde::{Deserialize, Serialize};

/// Outbound relay configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Whether mail goes through this relay at all. When `false` the
    /// application's HTTP mail API is used instead.
    #[serde(default)]
    pub enabled: bool,
    /// Relay hostname.
    #[serde(default)]
    pub host: String,
    /// Relay port.
    #[serde(default)]
    pub port: u16,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Envelope and `From:` address.
    #[serde(default)]
    pub sender_address: String,
    /// Display name for `From:`.
    #[serde(default)]
    pub sender_name: String,
    /// How the connection is encrypted.
    #[serde(default)]
    pub encryption_mode: EncryptionMode,
    /// Bound for TCP connect and TLS handshake, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Bound for each read and write, in seconds.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    /// Name announced in EHLO.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_hostname: Option<String>,
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

const fn default_io_timeout_secs() -> u64 {
    DEFAULT_IO_TIMEOUT.as_secs()
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            sender_address: String::new(),
            sender_name: String::new(),
            encryption_mode: EncryptionMode::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            client_hostname: None,
        }
    }
}

impl std::fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySettings")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender_address", &self.sender_address)
            .field("sender_name", &self.sender_name)
            .field("encryption_mode", &self.encryption_mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("io_timeout_secs", &self.io_timeout_secs)
            .field("client_hostname", &self.client_hostname)
            .finish()
    }
}

impl RelaySettings {
    /// Protocol-level session configuration.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let client_hostname = self
            .client_hostname
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CLIENT_HOSTNAME);

        SessionConfig::builder(self.host.trim())
            .port(self.port)
            .encryption(self.encryption_mode)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .io_timeout(Duration::from_secs(self.io_timeout_secs))
            .client_hostname(client_hostname)
            .build()
    }

    /// Login credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.trim(), self.password.as_str())
    }

    /// Sender mailbox, with the display name when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender address is malformed.
    pub fn sender(&self) -> mailprobe_smtp::Result<Mailbox> {
        Mailbox::with_name(self.sender_name.trim(), self.sender_address.as_str())
    }
}

/// A request to send one test message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    /// Where the test message goes.
    pub recipient_address: String,
    /// Relay to test.
    pub relay_settings: RelaySettings,
}

impl TestRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(recipient_address: impl Into<String>, relay_settings: RelaySettings) -> Self {
        Self {
            recipient_address: recipient_address.into(),
            relay_settings,
        }
    }
}

/// Validation error for relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Relay host is empty.
    EmptyHost,
    /// Relay port is zero.
    InvalidPort,
    /// Username is empty.
    EmptyUsername,
    /// Password is empty.
    EmptyPassword,
    /// Sender address is empty.
    EmptySender,
    /// Sender address cannot be used in an envelope.
    InvalidSender,
    /// Recipient address is empty.
    EmptyRecipient,
    /// Recipient address cannot be used in an envelope.
    InvalidRecipient,
    /// A timeout of zero seconds.
    InvalidTimeout,
    /// EHLO name with whitespace, control or non-ASCII characters.
    InvalidClientHostname,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyHost => "SMTP server is required",
            Self::InvalidPort => "SMTP port must be 1-65535",
            Self::EmptyUsername => "SMTP username is required",
            Self::EmptyPassword => "SMTP password is required",
            Self::EmptySender => "Sender address is required",
            Self::InvalidSender => "Invalid sender address format",
            Self::EmptyRecipient => "Recipient address is required",
            Self::InvalidRecipient => "Invalid recipient address format",
            Self::InvalidTimeout => "Timeouts must be at least one second",
            Self::InvalidClientHostname => "Client hostname must be a single ASCII word",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::EmptySender | Self::InvalidSender => "sender_address",
            Self::EmptyRecipient | Self::InvalidRecipient => "recipient_address",
            Self::InvalidTimeout => "timeout",
            Self::InvalidClientHostname => "client_hostname",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a request.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a relay test request.
///
/// Only meaningful when the relay is enabled; the HTTP path needs none of
/// these fields.
///
/// # Errors
///
/// Returns every problem found, not just the first.
pub fn validate_request(request: &TestRequest) -> ValidationResult {
    let settings = &request.relay_settings;
    let mut errors = Vec::new();

    if settings.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if settings.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if settings.username.trim().is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }
    if settings.password.is_empty() {
        errors.push(ValidationError::EmptyPassword);
    }
    if settings.connect_timeout_secs == 0 || settings.io_timeout_secs == 0 {
        errors.push(ValidationError::InvalidTimeout);
    }

    if let Some(name) = settings.client_hostname.as_deref() {
        let name = name.trim();
        if !name.is_empty() && !name.chars().all(|c| c.is_ascii_graphic()) {
            errors.push(ValidationError::InvalidClientHostname);
        }
    }

    if settings.sender_address.trim().is_empty() {
        errors.push(ValidationError::EmptySender);
    } else if Address::new(settings.sender_address.as_str()).is_err() {
        errors.push(ValidationError::InvalidSender);
    }

    if request.recipient_address.trim().is_empty() {
        errors.push(ValidationError::EmptyRecipient);
    } else if Address::new(request.recipient_address.as_str()).is_err() {
        errors.push(ValidationError::InvalidRecipient);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_settings() -> RelaySettings {
        RelaySettings {
            enabled: true,
            host: "smtp.example.com".into(),
            port: 587,
            username: "user".into(),
            password: "secret".into(),
            sender_address: "noreply@example.com".into(),
            sender_name: "Relay Check".into(),
            ..RelaySettings::default()
        }
    }

    #[test]
    fn test_deserialize_request() {
        let json = r#"{
            "recipient_address": "admin@example.org",
            "relay_settings": {
                "enabled": true,
                "host": "smtp.example.com",
                "port": 465,
                "username": "user",
                "password": "secret",
                "sender_address": "noreply@example.com",
                "sender_name": "Ops",
                "encryption_mode": "ssl"
            }
        }"#;

        let request: TestRequest = serde_json::from_str(json).unwrap();
        let settings = &request.relay_settings;
        assert_eq!(settings.encryption_mode, EncryptionMode::ImplicitTls);
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(settings.io_timeout_secs, 30);
        assert!(settings.client_hostname.is_none());
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_session_config_from_settings() {
        let settings = RelaySettings {
            host: " smtp.example.com ".into(),
            client_hostname: Some("probe.example.com".into()),
            io_timeout_secs: 5,
            ..valid_settings()
        };

        let config = settings.session_config();
        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.encryption, EncryptionMode::StartTls);
        assert_eq!(config.io_timeout, Duration::from_secs(5));
        assert_eq!(config.client_hostname, "probe.example.com");
    }

    #[test]
    fn test_blank_client_hostname_uses_default() {
        let settings = RelaySettings {
            client_hostname: Some("   ".into()),
            ..valid_settings()
        };
        assert_eq!(settings.session_config().client_hostname, "localhost");
    }

    #[test]
    fn test_sender_mailbox() {
        let sender = valid_settings().sender().unwrap();
        assert_eq!(sender.address.as_str(), "noreply@example.com");
        assert_eq!(sender.name.as_deref(), Some("Relay Check"));

        let unnamed = RelaySettings {
            sender_name: "  ".into(),
            ..valid_settings()
        };
        assert!(unnamed.sender().unwrap().name.is_none());
    }

    #[test]
    fn test_validate_empty_request() {
        let request = TestRequest::new("", RelaySettings::default());
        let errors = validate_request(&request).unwrap_err();

        assert!(errors.contains(&ValidationError::EmptyHost));
        assert!(errors.contains(&ValidationError::InvalidPort));
        assert!(errors.contains(&ValidationError::EmptyUsername));
        assert!(errors.contains(&ValidationError::EmptyPassword));
        assert!(errors.contains(&ValidationError::EmptySender));
        assert!(errors.contains(&ValidationError::EmptyRecipient));
    }

    #[test]
    fn test_validate_malformed_addresses() {
        let settings = RelaySettings {
            sender_address: "noreply".into(),
            ..valid_settings()
        };
        let request = TestRequest::new("admin@example.org>\r\nRCPT TO:<x@y.z", settings);
        let errors = validate_request(&request).unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::InvalidSender, ValidationError::InvalidRecipient]
        );
    }

    #[test]
    fn test_validate_zero_timeout() {
        let settings = RelaySettings {
            io_timeout_secs: 0,
            ..valid_settings()
        };
        let errors = validate_request(&TestRequest::new("a@example.org", settings)).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidTimeout]);
    }

    #[test]
    fn test_validate_client_hostname() {
        for bad in ["relay\r\nRSET", "relay host", "rélay.example.com"] {
            let settings = RelaySettings {
                client_hostname: Some(bad.into()),
                ..valid_settings()
            };
            let errors =
                validate_request(&TestRequest::new("a@example.org", settings)).unwrap_err();
            assert_eq!(errors, vec![ValidationError::InvalidClientHostname], "{bad:?}");
        }

        for good in ["relay.example.com", "[192.0.2.1]", "  "] {
            let settings = RelaySettings {
                client_hostname: Some(good.into()),
                ..valid_settings()
            };
            assert!(validate_request(&TestRequest::new("a@example.org", settings)).is_ok());
        }
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::InvalidPort.to_string(),
            "port: SMTP port must be 1-65535"
        );
        assert_eq!(ValidationError::InvalidSender.field(), "sender_address");
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", valid_settings());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }
}
