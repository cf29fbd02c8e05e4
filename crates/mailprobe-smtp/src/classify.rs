//! Maps protocol failures to user-facing categories.
//!
//! The technical string is always the full error text; classification only
//! picks the category.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// User-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Refused, unreachable, DNS failure, reset.
    Connection,
    /// No response within the configured bound.
    Timeout,
    /// Malformed reply or unexpected code outside authentication,
    /// including a refused STARTTLS.
    Protocol,
    /// Required extension (STARTTLS) not advertised.
    Capability,
    /// TLS handshake or certificate failure.
    Encryption,
    /// Credentials rejected.
    Authentication,
    /// Settings rejected before any connection was attempted.
    Configuration,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 7] = [
        Self::Connection,
        Self::Timeout,
        Self::Protocol,
        Self::Capability,
        Self::Encryption,
        Self::Authentication,
        Self::Configuration,
    ];

    /// Default (English) summary shown to the user.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Connection => "Could not connect to the mail server. Check the host and port.",
            Self::Timeout => "The mail server did not respond in time.",
            Self::Protocol => "The mail server sent an unexpected response.",
            Self::Capability => "The mail server does not offer STARTTLS encryption.",
            Self::Encryption => "Could not establish an encrypted connection to the mail server.",
            Self::Authentication => "The mail server rejected the username or password.",
            Self::Configuration => "The mail settings are incomplete or invalid.",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Capability => "capability",
            Self::Encryption => "encryption",
            Self::Authentication => "authentication",
            Self::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// A classified failure: category plus untranslated detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    /// Category for the user-facing message.
    pub category: Category,
    /// Full technical error text.
    pub technical: String,
}

/// Classifies an error.
#[must_use]
pub fn classify(error: &Error) -> Diagnosis {
    Diagnosis {
        category: category_of(error),
        technical: error.to_string(),
    }
}

fn category_of(error: &Error) -> Category {
    match error {
        Error::Io { .. } | Error::ConnectionClosed { .. } => Category::Connection,
        Error::Timeout { .. } => Category::Timeout,
        Error::Tls(_) | Error::InvalidHostname(_) => Category::Encryption,
        Error::NotSupported(_) => Category::Capability,
        Error::UnexpectedReply { step, .. } if step.is_authentication() => {
            Category::Authentication
        }
        Error::UnexpectedReply { .. } => Category::Protocol,
        Error::InvalidAddress(_) => Category::Configuration,
        Error::MalformedReply(_) | Error::MessageTooLarge { .. } | Error::SessionClosed => {
            Category::Protocol
        }
    }
}
