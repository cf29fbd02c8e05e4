//! SMTP response parser.
//!
//! Replies are single-line or multi-line:
//! - Single: `250 OK`
//! - Multi: `250-First line`, `250-Second line`, `250 Last line`
//!
//! [`ReplyParser`] is fed one physical line at a time (CRLF already removed)
//! and yields a [`Reply`] once the terminal line arrives. It never needs to
//! look ahead, so it works the same on a socket and in unit tests.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Separator after the code on a continuation line.
const CONTINUATION: u8 = b'-';
/// Separator after the code on the final line.
const TERMINAL: u8 = b' ';

/// Most physical lines accepted in one reply.
pub const MAX_REPLY_LINES: usize = 512;

/// Incremental reply parser.
#[derive(Debug, Default)]
pub struct ReplyParser {
    state: State,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Continuing {
        code: ReplyCode,
        lines: Vec<String>,
    },
}

impl ReplyParser {
    /// Creates a parser waiting for the first line of a reply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a multi-line reply has been started but not finished.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self.state, State::Continuing { .. })
    }

    /// Feeds one physical line.
    ///
    /// Returns `Ok(Some(reply))` when the line completes a reply and
    /// `Ok(None)` when more lines are needed. The parser resets after a
    /// complete reply or an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedReply`] if the line is shorter than four
    /// characters, has a non-numeric code or an unknown separator, or
    /// carries a different code than the line that opened the reply.
    pub fn feed(&mut self, line: &str) -> Result<Option<Reply>> {
        let result = self.step(line);
        if !matches!(result, Ok(None)) {
            self.state = State::Idle;
        }
        result
    }

    fn step(&mut self, line: &str) -> Result<Option<Reply>> {
        let (code, separator) = split_line(line)?;

        match &mut self.state {
            State::Idle => {
                if separator == TERMINAL {
                    return Ok(Some(Reply::new(code, vec![line.to_string()])));
                }
                self.state = State::Continuing {
                    code,
                    lines: vec![line.to_string()],
                };
                Ok(None)
            }
            State::Continuing {
                code: expected,
                lines,
            } => {
                if code != *expected {
                    return Err(Error::MalformedReply(format!(
                        "code changed from {expected} to {code} inside a multi-line reply: {line}"
                    )));
                }
                if lines.len() >= MAX_REPLY_LINES {
                    return Err(Error::MalformedReply(format!(
                        "reply exceeds {MAX_REPLY_LINES} lines"
                    )));
                }
                lines.push(line.to_string());
                if separator == TERMINAL {
                    let lines = std::mem::take(lines);
                    return Ok(Some(Reply::new(code, lines)));
                }
                Ok(None)
            }
        }
    }
}

/// Extracts the code and separator byte from a physical line.
fn split_line(line: &str) -> Result<(ReplyCode, u8)> {
    let bytes = line.as_bytes();
    if bytes.len() < 4 {
        return Err(Error::MalformedReply(format!("Reply line too short: {line:?}")));
    }

    if !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Error::MalformedReply(format!("Invalid reply code: {line:?}")));
    }

    let separator = bytes[3];
    if separator != CONTINUATION && separator != TERMINAL {
        return Err(Error::MalformedReply(format!(
            "Invalid separator after reply code: {line:?}"
        )));
    }

    let code = bytes[..3]
        .iter()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
    Ok((ReplyCode::new(code), separator))
}

/// Parses a complete reply from a slice of physical lines.
///
/// # Errors
///
/// Returns an error if any line is malformed, if the lines end before the
/// reply is complete, or if lines remain after the terminal line.
pub fn parse_reply<S: AsRef<str>>(lines: &[S]) -> Result<Reply> {
    let mut parser = ReplyParser::new();
    let mut iter = lines.iter();

    for line in iter.by_ref() {
        if let Some(reply) = parser.feed(line.as_ref())? {
            if let Some(extra) = iter.next() {
                return Err(Error::MalformedReply(format!(
                    "Trailing line after terminal reply line: {}",
                    extra.as_ref()
                )));
            }
            return Ok(reply);
        }
    }

    Err(Error::MalformedReply("Reply ended without a terminal line".into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_single_line_reply() {
        let reply = parse_reply(&["250 OK"]).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.lines, vec!["250 OK"]);
    }

    #[test]
    fn test_parse_multi_line_reply() {
        let reply = parse_reply(&["250-first", "250-second", "250 third"]).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.lines, vec!["250-first", "250-second", "250 third"]);
    }

    #[test]
    fn test_feed_reports_partial_state() {
        let mut parser = ReplyParser::new();
        assert!(parser.feed("250-smtp.example.com").unwrap().is_none());
        assert!(parser.is_partial());
        let reply = parser.feed("250 STARTTLS").unwrap().unwrap();
        assert_eq!(reply.lines.len(), 2);
        assert!(!parser.is_partial());
    }

    #[test]
    fn test_different_code_never_terminates() {
        let mut parser = ReplyParser::new();
        parser.feed("250-first").unwrap();
        assert!(parser.feed("251 other").is_err());
        // Parser is reset and usable again.
        assert!(!parser.is_partial());
        assert!(parser.feed("221 bye").unwrap().is_some());
    }

    #[test]
    fn test_short_and_empty_lines_fail_fast() {
        let mut parser = ReplyParser::new();
        assert!(parser.feed("").is_err());
        assert!(parser.feed("250").is_err());
        assert!(parser.feed("25").is_err());
    }

    #[test]
    fn test_continuation_is_capped() {
        let mut parser = ReplyParser::new();
        for _ in 0..MAX_REPLY_LINES {
            assert!(parser.feed("250-more").unwrap().is_none());
        }
        let err = parser.feed("250-more").unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
        assert!(!parser.is_partial());
    }

    #[test]
    fn test_invalid_code_and_separator() {
        assert!(parse_reply(&["ABC OK"]).is_err());
        assert!(parse_reply(&["250_OK"]).is_err());
    }

    #[test]
    fn test_incomplete_and_trailing() {
        assert!(parse_reply(&["250-first"]).is_err());
        assert!(parse_reply(&["250 done", "250 extra"]).is_err());
        assert!(parse_reply::<&str>(&[]).is_err());
    }

    proptest! {
        #[test]
        fn single_line_roundtrip(code in 200u16..600, text in "[ -~]{0,40}") {
            let line = format!("{code} {text}");
            let reply = parse_reply(&[line.as_str()]).unwrap();
            prop_assert_eq!(reply.code.as_u16(), code);
            prop_assert_eq!(reply.lines, vec![line]);
        }

        #[test]
        fn multi_line_keeps_every_line(
            code in 200u16..600,
            texts in proptest::collection::vec("[A-Za-z0-9 ]{0,20}", 1..8),
        ) {
            let last = texts.len() - 1;
            let lines: Vec<String> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{code}{}{t}", if i == last { ' ' } else { '-' }))
                .collect();
            let reply = parse_reply(&lines).unwrap();
            prop_assert_eq!(reply.code.as_u16(), code);
            prop_assert_eq!(reply.lines, lines);
        }

        #[test]
        fn mismatched_terminal_code_is_rejected(code in 200u16..599) {
            let mut parser = ReplyParser::new();
            parser.feed(&format!("{code}-first")).unwrap();
            let other = format!("{} last", code + 1);
            prop_assert!(parser.feed(&other).is_err());
        }
    }
}
