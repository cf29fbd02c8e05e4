//! Handshake steps and the reply codes each one accepts.

use crate::connection::EncryptionMode;
use crate::types::ReplyCode;

/// One request/response pair in the submission handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Server banner, read before anything is sent.
    Greeting,
    /// First capability discovery.
    Ehlo,
    /// STARTTLS request.
    StartTls,
    /// Capability discovery over the encrypted stream.
    EhloAfterTls,
    /// `AUTH LOGIN`.
    AuthStart,
    /// Base64 username.
    AuthUsername,
    /// Base64 password.
    AuthPassword,
    /// `MAIL FROM`.
    MailFrom,
    /// `RCPT TO`.
    RcptTo,
    /// `DATA`.
    DataStart,
    /// Message content and end-of-data marker.
    Body,
    /// `QUIT`.
    Quit,
}

impl Step {
    /// Reply codes that let the handshake move on.
    #[must_use]
    pub const fn expected(self) -> &'static [ReplyCode] {
        match self {
            Self::Greeting | Self::StartTls => &[ReplyCode::SERVICE_READY],
            Self::Ehlo | Self::EhloAfterTls | Self::MailFrom | Self::Body => &[ReplyCode::OK],
            Self::AuthStart | Self::AuthUsername => &[ReplyCode::AUTH_CONTINUE],
            // Some servers answer 503 when the session is already authenticated.
            Self::AuthPassword => &[ReplyCode::AUTH_SUCCESS, ReplyCode::BAD_SEQUENCE],
            Self::RcptTo => &[ReplyCode::OK, ReplyCode::FORWARD],
            Self::DataStart => &[ReplyCode::START_DATA],
            Self::Quit => &[ReplyCode::CLOSING],
        }
    }

    /// Returns true if `code` is in [`Step::expected`].
    #[must_use]
    pub fn accepts(self, code: ReplyCode) -> bool {
        self.expected().contains(&code)
    }

    /// Step that follows this one, or `None` after QUIT.
    #[must_use]
    pub const fn next(self, encryption: EncryptionMode) -> Option<Self> {
        let next = match self {
            Self::Greeting => Self::Ehlo,
            Self::Ehlo => match encryption {
                EncryptionMode::StartTls => Self::StartTls,
                EncryptionMode::None | EncryptionMode::ImplicitTls => Self::AuthStart,
            },
            Self::StartTls => Self::EhloAfterTls,
            Self::EhloAfterTls => Self::AuthStart,
            Self::AuthStart => Self::AuthUsername,
            Self::AuthUsername => Self::AuthPassword,
            Self::AuthPassword => Self::MailFrom,
            Self::MailFrom => Self::RcptTo,
            Self::RcptTo => Self::DataStart,
            Self::DataStart => Self::Body,
            Self::Body => Self::Quit,
            Self::Quit => return None,
        };
        Some(next)
    }

    /// Full ordered plan for a session in `encryption` mode.
    #[must_use]
    pub fn sequence(encryption: EncryptionMode) -> Vec<Self> {
        std::iter::successors(Some(Self::Greeting), |step| step.next(encryption)).collect()
    }

    /// Returns true for the steps of the AUTH exchange.
    #[must_use]
    pub const fn is_authentication(self) -> bool {
        matches!(self, Self::AuthStart | Self::AuthUsername | Self::AuthPassword)
    }

    /// Short name used in logs and error text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::EhloAfterTls => "EHLO after STARTTLS",
            Self::AuthStart => "AUTH LOGIN",
            Self::AuthUsername => "AUTH username",
            Self::AuthPassword => "AUTH password",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::DataStart => "DATA",
            Self::Body => "message body",
            Self::Quit => "QUIT",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
