//! Connection management: line transport, TLS upgrade, session handle.

mod config;
mod session;
mod stream;
mod upgrade;

pub use config::{
    DEFAULT_CLIENT_HOSTNAME, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT, EncryptionMode,
    SessionConfig, SessionConfigBuilder,
};
pub use session::Session;
pub use stream::{AsyncStream, BoxedStream, LineTransport, MAX_LINE_LEN, connect_tcp};
pub use upgrade::{RustlsUpgrader, Upgrader};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// Server capabilities from greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if AUTH LOGIN was advertised.
    #[must_use]
    pub fn supports_auth_login(&self) -> bool {
        self.auth_mechanisms().contains(&AuthMechanism::Login)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns supported authentication mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}
