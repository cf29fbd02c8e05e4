//! The single result handed back to the caller.

use mailprobe_smtp::Category;
use serde::{Deserialize, Serialize};

/// Which path delivered (or tried to deliver) the test message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// The configured SMTP relay.
    Smtp,
    /// The application's HTTP mail API.
    Http,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Smtp => "smtp",
            Self::Http => "http",
        })
    }
}

/// Outcome of one test invocation.
///
/// Built only through [`OutcomeReport::success`] and
/// [`OutcomeReport::failure`], so a failure always carries a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeReport {
    /// Whether the message was accepted.
    pub success: bool,
    /// Short, localised, user-facing text.
    pub message: String,
    /// Raw error text for support diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<String>,
    /// Failure category; `None` on success.
    #[serde(default)]
    pub category: Option<Category>,
    /// Path taken.
    pub transport: TransportKind,
}

impl OutcomeReport {
    /// A successful outcome.
    #[must_use]
    pub fn success(transport: TransportKind, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            technical: None,
            category: None,
            transport,
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failure(
        transport: TransportKind,
        category: Category,
        message: impl Into<String>,
        technical: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            technical: Some(technical.into()),
            category: Some(category),
            transport,
        }
    }
}
