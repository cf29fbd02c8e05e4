//! Test message composition and DATA transparency.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

use crate::types::{Address, Mailbox};

/// Sender, recipient and content of the single test message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Sender (`MAIL FROM` and `From:`).
    pub from: Mailbox,
    /// Recipient (`RCPT TO` and `To:`).
    pub to: Address,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(
        from: Mailbox,
        to: Address,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }

    /// Builds the RFC 5322 message: headers, blank line, HTML body.
    /// Line endings are CRLF throughout.
    #[must_use]
    pub fn to_rfc5322(&self, date: DateTime<Utc>) -> String {
        use std::fmt::Write;

        let mut message = String::new();

        let _ = write!(message, "Date: {}\r\n", date.to_rfc2822());
        let _ = write!(message, "From: {}\r\n", self.from.header_value());
        let _ = write!(message, "To: {}\r\n", self.to);
        let _ = write!(message, "Subject: {}\r\n", subject_header(&self.subject));
        let _ = write!(
            message,
            "Message-ID: <{}.{}@{}>\r\n",
            date.timestamp_micros(),
            std::process::id(),
            self.from.address.domain()
        );
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/html; charset=utf-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");
        message.push_str("\r\n");
        message.push_str(&normalize_line_endings(&self.html_body));

        message
    }

    /// Message bytes ready for DATA: CRLF-normalised, dot-stuffed and
    /// ending in CRLF, so the `.` terminator lands on its own line.
    #[must_use]
    pub fn to_wire(&self, date: DateTime<Utc>) -> Vec<u8> {
        dot_stuff(self.to_rfc5322(date).as_bytes())
    }
}

/// Applies SMTP transparency: any line beginning with `.` gets one more.
///
/// Bare `\n` and `\r\n` are both treated as line breaks and emitted as
/// CRLF. The output always ends with CRLF.
#[must_use]
pub fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);
    let body = message.strip_suffix(b"\n").unwrap_or(message);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out
}

/// Encodes `text` as a single RFC 2047 base64 word.
#[must_use]
pub fn encode_header_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", STANDARD.encode(text.as_bytes()))
}

/// Subject header value: CR/LF removed, non-ASCII encoded.
fn subject_header(subject: &str) -> String {
    let flat: String = subject
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    if flat.is_ascii() {
        flat
    } else {
        encode_header_word(&flat)
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}
