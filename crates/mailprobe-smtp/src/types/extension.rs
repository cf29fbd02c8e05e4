//! EHLO capability keywords.

/// One capability line of an EHLO reply.
///
/// Only `STARTTLS`, `AUTH` and `SIZE` influence the handshake; the rest are
/// kept so the capability set can be logged as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `STARTTLS`
    StartTls,
    /// `AUTH` with the mechanisms this client recognises.
    Auth(Vec<AuthMechanism>),
    /// `SIZE`, with the limit in bytes when one was given.
    Size(Option<usize>),
    /// `8BITMIME`
    EightBitMime,
    /// `PIPELINING` (recorded, never used)
    Pipelining,
    /// `SMTPUTF8`
    SmtpUtf8,
    /// Any other keyword, with its parameters.
    Unknown(String),
}

impl Extension {
    /// Parses the text of one EHLO line (code prefix already stripped).
    /// Keywords are case-insensitive.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (keyword, params) = line.split_once(' ').unwrap_or((line, ""));

        if keyword.eq_ignore_ascii_case("STARTTLS") {
            Self::StartTls
        } else if keyword.eq_ignore_ascii_case("AUTH") {
            Self::Auth(
                params
                    .split_whitespace()
                    .filter_map(AuthMechanism::from_name)
                    .collect(),
            )
        } else if keyword.eq_ignore_ascii_case("SIZE") {
            Self::Size(params.trim().parse().ok())
        } else if keyword.eq_ignore_ascii_case("8BITMIME") {
            Self::EightBitMime
        } else if keyword.eq_ignore_ascii_case("PIPELINING") {
            Self::Pipelining
        } else if keyword.eq_ignore_ascii_case("SMTPUTF8") {
            Self::SmtpUtf8
        } else {
            Self::Unknown(line.to_string())
        }
    }
}

/// SASL mechanisms a relay may advertise. Only `LOGIN` is ever used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// `PLAIN`
    Plain,
    /// `LOGIN`: username and password in separate base64 rounds.
    Login,
    /// `CRAM-MD5`
    CramMd5,
    /// `XOAUTH2`
    XOAuth2,
}

impl AuthMechanism {
    const ALL: [Self; 4] = [Self::Plain, Self::Login, Self::CramMd5, Self::XOAuth2];

    /// Looks up a mechanism by its advertised name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mechanism| mechanism.as_str().eq_ignore_ascii_case(name))
    }

    /// Name as sent in `AUTH`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::CramMd5 => "CRAM-MD5",
            Self::XOAuth2 => "XOAUTH2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(Extension::parse("STARTTLS"), Extension::StartTls);
        assert_eq!(Extension::parse("starttls"), Extension::StartTls);
        assert_eq!(Extension::parse("8bitmime"), Extension::EightBitMime);
    }

    #[test]
    fn auth_keeps_only_known_mechanisms() {
        assert_eq!(
            Extension::parse("AUTH PLAIN LOGIN GSSAPI"),
            Extension::Auth(vec![AuthMechanism::Plain, AuthMechanism::Login])
        );
        assert_eq!(Extension::parse("AUTH"), Extension::Auth(vec![]));
    }

    #[test]
    fn size_with_and_without_limit() {
        assert_eq!(
            Extension::parse("SIZE 52428800"),
            Extension::Size(Some(52_428_800))
        );
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
        assert_eq!(Extension::parse("SIZE lots"), Extension::Size(None));
    }

    #[test]
    fn unrecognised_lines_are_kept_verbatim() {
        assert_eq!(
            Extension::parse("X-CUSTOM foo"),
            Extension::Unknown("X-CUSTOM foo".to_string())
        );
        assert_eq!(Extension::parse(""), Extension::Unknown(String::new()));
    }

    #[test]
    fn mechanism_names() {
        assert_eq!(
            AuthMechanism::from_name("cram-md5"),
            Some(AuthMechanism::CramMd5)
        );
        assert_eq!(AuthMechanism::Login.as_str(), "LOGIN");
        assert_eq!(AuthMechanism::from_name("NTLM"), None);
    }
}
