//! User-facing text, overridable for translation.

use std::collections::HashMap;

use mailprobe_smtp::Category;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Localised strings for reports and the test message itself.
///
/// Missing entries fall back to the English defaults, so a partial JSON
/// override is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    /// Shown when the message was accepted.
    pub success: String,
    /// Shown when the HTTP mail API failed.
    pub http_failure: String,
    /// Per-category failure summaries.
    pub categories: HashMap<Category, String>,
    /// Subject of the test message.
    pub test_subject: String,
    /// HTML body of the test message.
    pub test_body: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            success: "Test email sent successfully.".to_string(),
            http_failure: "The mail service could not send the test email.".to_string(),
            categories: HashMap::new(),
            test_subject: "Test email".to_string(),
            test_body: "<p>This is a test email to confirm that your outgoing mail \
                        settings work.</p>"
                .to_string(),
        }
    }
}

impl MessageCatalog {
    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a catalog.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Summary for a failure category.
    #[must_use]
    pub fn summary(&self, category: Category) -> &str {
        self.categories
            .get(&category)
            .map_or(category.summary(), String::as_str)
    }
}
