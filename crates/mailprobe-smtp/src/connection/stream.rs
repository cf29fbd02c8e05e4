//! Line-oriented transport over any byte stream.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::{Error, Result};
use crate::parser::ReplyParser;
use crate::types::Reply;

/// Longest physical reply line accepted, CRLF included.
pub const MAX_LINE_LEN: u64 = 4096;

/// A readable and writable byte stream (plain TCP, TLS, or a test double).
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

/// Type-erased stream so the transport can be rebound after a TLS upgrade.
pub type BoxedStream = Box<dyn AsyncStream>;

/// Runs an I/O future under a deadline, naming the operation on failure.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    after: Duration,
    fut: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(after, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) if err.kind() == io::ErrorKind::TimedOut => {
            Err(Error::Timeout { operation, after })
        }
        Ok(Err(err)) => Err(Error::io(operation, err)),
        Err(_) => Err(Error::Timeout { operation, after }),
    }
}

/// Opens a TCP connection to `address` within `after`.
///
/// # Errors
///
/// Returns [`Error::Io`] if resolution or connect fails and
/// [`Error::Timeout`] if the bound elapses.
pub async fn connect_tcp(address: &str, after: Duration) -> Result<BoxedStream> {
    let tcp = bounded("connect", after, TcpStream::connect(address)).await?;
    // Commands are small and strictly request/response.
    let _ = tcp.set_nodelay(true);
    Ok(Box::new(tcp))
}

/// CRLF line transport.
///
/// Every write is flushed before returning, so a read never races an
/// unsent command.
pub struct LineTransport {
    reader: BufReader<BoxedStream>,
    io_timeout: Duration,
}

impl LineTransport {
    /// Wraps a stream.
    #[must_use]
    pub fn new(stream: BoxedStream, io_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(stream),
            io_timeout,
        }
    }

    /// Writes `line` followed by CRLF and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails or times out.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");
        self.write_raw(&data).await
    }

    /// Writes pre-formatted bytes and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails or times out.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        bounded("write", self.io_timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await
    }

    /// Reads one physical line with the line terminator removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] on EOF, [`Error::MalformedReply`]
    /// if the line exceeds [`MAX_LINE_LEN`], or an I/O/timeout error.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let mut limited = (&mut self.reader).take(MAX_LINE_LEN);
        let read = bounded(
            "read reply",
            self.io_timeout,
            limited.read_until(b'\n', &mut buf),
        )
        .await?;

        if read == 0 {
            return Err(Error::ConnectionClosed {
                operation: "read reply",
            });
        }
        if buf.last() != Some(&b'\n') {
            if u64::try_from(read).is_ok_and(|n| n >= MAX_LINE_LEN) {
                return Err(Error::MalformedReply(format!(
                    "Reply line exceeds {MAX_LINE_LEN} bytes"
                )));
            }
            return Err(Error::ConnectionClosed {
                operation: "read reply",
            });
        }

        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Reads one logical reply, spanning as many physical lines as needed.
    ///
    /// The whole reply, not just each line, must arrive within the I/O
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the reply is not complete in time, or
    /// an error if a line cannot be read or the reply is malformed.
    pub async fn read_reply(&mut self) -> Result<Reply> {
        let after = self.io_timeout;
        tokio::time::timeout(after, self.read_reply_lines())
            .await
            .map_err(|_| Error::Timeout {
                operation: "read reply",
                after,
            })?
    }

    async fn read_reply_lines(&mut self) -> Result<Reply> {
        let mut parser = ReplyParser::new();
        loop {
            let line = self.read_line().await?;
            if let Some(reply) = parser.feed(&line)? {
                return Ok(reply);
            }
        }
    }

    /// Returns true if bytes were received beyond the last reply.
    #[must_use]
    pub fn has_buffered_input(&self) -> bool {
        !self.reader.buffer().is_empty()
    }

    /// Releases the underlying stream. Any buffered input is discarded.
    #[must_use]
    pub fn into_inner(self) -> BoxedStream {
        self.reader.into_inner()
    }

    /// Shuts down the write side of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails or times out.
    pub async fn shutdown(&mut self) -> Result<()> {
        let stream = self.reader.get_mut();
        bounded("close", self.io_timeout, stream.shutdown()).await
    }
}

impl std::fmt::Debug for LineTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineTransport")
            .field("io_timeout", &self.io_timeout)
            .field("buffered", &self.reader.buffer().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn transport(mock: tokio_test::io::Mock) -> LineTransport {
        LineTransport::new(Box::new(mock), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn write_line_appends_crlf() {
        let mock = Builder::new().write(b"EHLO localhost\r\n").build();
        let mut transport = transport(mock);
        transport.write_line("EHLO localhost").await.unwrap();
    }

    #[tokio::test]
    async fn read_reply_spans_lines() {
        let mock = Builder::new()
            .read(b"250-smtp.example.com\r\n250-SIZE 1000\r\n")
            .read(b"250 STARTTLS\r\n")
            .build();
        let mut transport = transport(mock);
        let reply = transport.read_reply().await.unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(
            reply.lines,
            vec!["250-smtp.example.com", "250-SIZE 1000", "250 STARTTLS"]
        );
    }

    #[tokio::test]
    async fn read_reply_accepts_bare_lf() {
        let mock = Builder::new().read(b"220 ready\n").build();
        let reply = transport(mock).read_reply().await.unwrap();
        assert_eq!(reply.lines, vec!["220 ready"]);
    }

    #[tokio::test]
    async fn empty_line_fails_fast() {
        let mock = Builder::new().read(b"\r\n").build();
        let err = transport(mock).read_reply().await.unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[tokio::test]
    async fn eof_is_connection_closed() {
        let mock = Builder::new().read(b"250-partial\r\n").build();
        let err = transport(mock).read_reply().await.unwrap_err();
        assert!(matches!(
            err,
            Error::ConnectionClosed {
                operation: "read reply"
            }
        ));
    }

    #[tokio::test]
    async fn read_error_names_operation() {
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            .build();
        let err = transport(mock).read_reply().await.unwrap_err();
        assert_eq!(err.to_string(), "read reply failed: reset by peer");
    }

    #[tokio::test]
    async fn endless_continuation_times_out() {
        let (client, mut server) = tokio::io::duplex(1024);
        let feeder = tokio::spawn(async move {
            while server.write_all(b"250-x\r\n").await.is_ok() {
                tokio::task::yield_now().await;
            }
        });

        let mut transport = LineTransport::new(Box::new(client), Duration::from_millis(200));
        let outcome =
            tokio::time::timeout(Duration::from_secs(5), transport.read_reply()).await;
        feeder.abort();

        let err = outcome.expect("reply read must be bounded").unwrap_err();
        assert!(
            matches!(
                err,
                Error::Timeout { operation: "read reply", .. } | Error::MalformedReply(_)
            ),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn slow_trickle_of_continuations_times_out() {
        let (client, mut server) = tokio::io::duplex(1024);
        let feeder = tokio::spawn(async move {
            loop {
                if server.write_all(b"250-x\r\n").await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        let mut transport = LineTransport::new(Box::new(client), Duration::from_millis(300));
        let err = transport.read_reply().await.unwrap_err();
        feeder.abort();

        assert!(matches!(
            err,
            Error::Timeout {
                operation: "read reply",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn overlong_line_is_rejected() {
        let long = vec![b'a'; usize::try_from(MAX_LINE_LEN).unwrap()];
        let mock = Builder::new().read(&long).build();
        let mut transport = transport(mock);
        let err = transport.read_line().await.unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }
}
