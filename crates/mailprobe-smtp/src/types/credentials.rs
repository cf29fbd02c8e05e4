//! Relay login credentials.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Username and password for AUTH LOGIN.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Base64 form of the username, as sent in the AUTH LOGIN exchange.
    #[must_use]
    pub fn encoded_username(&self) -> String {
        STANDARD.encode(self.username.as_bytes())
    }

    /// Base64 form of the password, as sent in the AUTH LOGIN exchange.
    #[must_use]
    pub fn encoded_password(&self) -> String {
        STANDARD.encode(self.password.as_bytes())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_login_tokens() {
        let creds = Credentials::new("user", "pass");
        assert_eq!(creds.encoded_username(), "dXNlcg==");
        assert_eq!(creds.encoded_password(), "cGFzcw==");
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }
}
