//! A single SMTP session over a swappable transport.

use tracing::debug;

use super::config::{EncryptionMode, SessionConfig};
use super::stream::{BoxedStream, LineTransport, connect_tcp};
use super::upgrade::Upgrader;
use super::ServerInfo;
use crate::command::Command;
use crate::engine::Step;
use crate::error::{Error, Result};
use crate::types::{Extension, Reply};

/// Mutable handle around the current [`LineTransport`].
///
/// Created on connect, rebound in place by [`Session::start_tls`], and
/// released by [`Session::close`]. Dropping an open session also releases
/// the socket, so an aborted future cannot leak it.
#[derive(Debug)]
pub struct Session {
    transport: Option<LineTransport>,
    config: SessionConfig,
    server_info: ServerInfo,
    tls: bool,
}

impl Session {
    /// Connects to the configured server. For implicit TLS the handshake
    /// runs before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or handshake fails or times out.
    pub async fn connect<U: Upgrader>(config: &SessionConfig, upgrader: &U) -> Result<Self> {
        let address = config.address();
        debug!(%address, encryption = ?config.encryption, "connecting");

        let stream = connect_tcp(&address, config.connect_timeout).await?;
        let mut session = Self::from_stream(stream, config.clone());

        if config.encryption == EncryptionMode::ImplicitTls {
            session.upgrade(upgrader).await?;
        }

        Ok(session)
    }

    /// Wraps an already-open stream.
    #[must_use]
    pub fn from_stream(stream: BoxedStream, config: SessionConfig) -> Self {
        Self {
            transport: Some(LineTransport::new(stream, config.io_timeout)),
            config,
            server_info: ServerInfo::default(),
            tls: false,
        }
    }

    /// Returns what the server has told us so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true after [`Session::close`].
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    fn transport(&mut self) -> Result<&mut LineTransport> {
        self.transport.as_mut().ok_or(Error::SessionClosed)
    }

    /// Reads the next reply and checks it against `step`'s accepted codes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedReply`] if the code is not accepted, or
    /// any read error.
    pub async fn expect(&mut self, step: Step) -> Result<Reply> {
        let reply = self.transport()?.read_reply().await?;
        debug!(%step, code = %reply.code, "reply");

        if !step.accepts(reply.code) {
            return Err(Error::UnexpectedReply {
                step,
                code: reply.code.as_u16(),
                message: reply.message_text(),
            });
        }
        Ok(reply)
    }

    /// Sends `command` and validates the reply against `step`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or the reply is not accepted.
    pub async fn exchange(&mut self, step: Step, command: &Command) -> Result<Reply> {
        debug!(%step, command = %command.redacted(), "send");
        self.transport()?.write_line(&command.to_line()).await?;
        self.expect(step).await
    }

    /// Writes message data that is already dot-stuffed and CRLF-terminated.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_data(&mut self, data: &[u8]) -> Result<()> {
        debug!(bytes = data.len(), "send message body");
        self.transport()?.write_raw(data).await
    }

    /// Writes a bare line (used for the end-of-data marker).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        self.transport()?.write_line(line).await
    }

    /// Reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is not a 220.
    pub async fn greeting(&mut self) -> Result<()> {
        let reply = self.expect(Step::Greeting).await?;
        self.server_info.hostname = reply
            .text_lines()
            .next()
            .and_then(|text| text.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        Ok(())
    }

    /// Sends EHLO and replaces the known capability set.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer 250.
    pub async fn ehlo(&mut self, step: Step) -> Result<()> {
        let command = Command::Ehlo {
            hostname: self.config.client_hostname.clone(),
        };
        let reply = self.exchange(step, &command).await?;

        // First line is the server's self-identification.
        self.server_info.extensions = reply
            .text_lines()
            .skip(1)
            .map(Extension::parse)
            .collect();
        debug!(
            extensions = self.server_info.extensions.len(),
            tls = self.tls,
            "capabilities"
        );
        Ok(())
    }

    /// Negotiates STARTTLS and rebinds the transport to the encrypted
    /// stream. Capabilities are cleared; the caller must send EHLO again.
    ///
    /// Nothing is written if the server did not advertise STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if STARTTLS was not advertised,
    /// [`Error::UnexpectedReply`] if the command is refused, or a TLS error
    /// if the handshake fails.
    pub async fn start_tls<U: Upgrader>(&mut self, upgrader: &U) -> Result<()> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.exchange(Step::StartTls, &Command::StartTls).await?;

        // Anything already queued behind the 220 was sent in plaintext and
        // must not be read as if it arrived over TLS.
        if self.transport()?.has_buffered_input() {
            return Err(Error::MalformedReply(
                "Server sent data after STARTTLS go-ahead".into(),
            ));
        }

        self.upgrade(upgrader).await?;
        self.server_info.extensions.clear();
        Ok(())
    }

    /// Swaps the transport for one bound to the encrypted stream.
    async fn upgrade<U: Upgrader>(&mut self, upgrader: &U) -> Result<()> {
        let transport = self.transport.take().ok_or(Error::SessionClosed)?;
        let stream = transport.into_inner();

        let after = self.config.connect_timeout;
        let handshake = upgrader.upgrade(stream, &self.config.host);
        let encrypted = tokio::time::timeout(after, handshake)
            .await
            .map_err(|_| Error::Timeout {
                operation: "TLS handshake",
                after,
            })??;

        self.transport = Some(LineTransport::new(encrypted, self.config.io_timeout));
        self.tls = true;
        debug!(host = %self.config.host, "TLS established");
        Ok(())
    }

    /// Sends QUIT. Best-effort: by now the message is either accepted or
    /// the session already failed, so neither a failed write nor a missing
    /// acknowledgement is returned. Both are logged.
    pub async fn quit(&mut self) {
        debug!(command = "QUIT", "send");
        let result = match self.transport() {
            Ok(transport) => transport.write_line(&Command::Quit.to_line()).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            debug!(error = %err, "ignoring QUIT write failure");
            return;
        }
        if let Err(err) = self.expect(Step::Quit).await {
            debug!(error = %err, "ignoring QUIT acknowledgement failure");
        }
    }

    /// Shuts down and releases the connection.
    ///
    /// Safe to call any number of times; only the first call does anything.
    pub async fn close(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };
        if let Err(err) = transport.shutdown().await {
            debug!(error = %err, "error while closing connection");
        }
        debug!("connection closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.transport.is_some() {
            debug!("session dropped while open; releasing socket");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::io::Builder;

    fn config() -> SessionConfig {
        SessionConfig::builder("smtp.example.com")
            .io_timeout(Duration::from_secs(5))
            .build()
    }

    fn session(mock: tokio_test::io::Mock) -> Session {
        Session::from_stream(Box::new(mock), config())
    }

    #[tokio::test]
    async fn ehlo_records_capabilities() {
        let mock = Builder::new()
            .read(b"220 smtp.example.com ESMTP\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250-smtp.example.com\r\n250-STARTTLS\r\n250 AUTH LOGIN PLAIN\r\n")
            .build();
        let mut session = session(mock);
        session.greeting().await.unwrap();
        session.ehlo(Step::Ehlo).await.unwrap();

        assert_eq!(session.server_info().hostname, "smtp.example.com");
        assert!(session.server_info().supports_starttls());
        assert!(session.server_info().supports_auth_login());
    }

    #[tokio::test]
    async fn start_tls_without_capability_writes_nothing() {
        // Mock panics on any unexpected write.
        let mock = Builder::new().build();
        let mut session = session(mock);
        let err = session
            .start_tls(&crate::connection::RustlsUpgrader::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotSupported(_)));
    }

    #[tokio::test]
    async fn rejected_reply_reports_step() {
        let mock = Builder::new()
            .write(b"MAIL FROM:<a@example.com>\r\n")
            .read(b"550 sender rejected\r\n")
            .build();
        let mut session = session(mock);
        let command = Command::MailFrom {
            from: crate::types::Address::new("a@example.com").unwrap(),
        };
        let err = session.exchange(Step::MailFrom, &command).await.unwrap_err();
        match err {
            Error::UnexpectedReply {
                step,
                code,
                message,
            } => {
                assert_eq!(step, Step::MailFrom);
                assert_eq!(code, 550);
                assert_eq!(message, "sender rejected");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn quit_tolerates_missing_ack() {
        let mock = Builder::new().write(b"QUIT\r\n").build();
        let mut session = session(mock);
        session.quit().await;
    }

    #[tokio::test]
    async fn quit_tolerates_write_failure() {
        let mock = Builder::new()
            .write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "broken pipe",
            ))
            .build();
        let mut session = session(mock);
        session.quit().await;
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut session = session(Builder::new().build());
        session.close().await;
        assert!(session.is_closed());
        session.close().await;
        assert!(session.is_closed());
        assert!(matches!(
            session.expect(Step::Greeting).await,
            Err(Error::SessionClosed)
        ));
    }
}
