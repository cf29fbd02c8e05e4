//! Protocol engine: drives one submission through the step table.
//!
//! The session walks [`Step::sequence`] for the configured encryption mode.
//! Each step is a single request/response pair checked against
//! [`Step::expected`]; the first rejection aborts the walk. The connection
//! is closed exactly once whatever the outcome.

mod step;

pub use step::Step;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::connection::{RustlsUpgrader, Session, SessionConfig, Upgrader};
use crate::error::{Error, Result};
use crate::message::Envelope;
use crate::types::{AuthMechanism, Credentials};

/// End-of-data marker.
const DATA_TERMINATOR: &str = ".";

/// Single-shot submission client.
#[derive(Debug, Clone)]
pub struct Engine<U = RustlsUpgrader> {
    config: SessionConfig,
    credentials: Credentials,
    upgrader: U,
}

impl Engine<RustlsUpgrader> {
    /// Creates an engine verifying TLS against the bundled web PKI roots.
    #[must_use]
    pub fn new(config: SessionConfig, credentials: Credentials) -> Self {
        Self::with_upgrader(config, credentials, RustlsUpgrader::new())
    }
}

impl<U: Upgrader> Engine<U> {
    /// Creates an engine with a custom TLS upgrader.
    #[must_use]
    pub fn with_upgrader(config: SessionConfig, credentials: Credentials, upgrader: U) -> Self {
        Self {
            config,
            credentials,
            upgrader,
        }
    }

    /// Connects, authenticates and submits `envelope`, then closes.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the handshake. The connection has
    /// already been closed when this returns.
    pub async fn submit(&self, envelope: &Envelope) -> Result<()> {
        let data = envelope.to_wire(Utc::now());

        let mut session = Session::connect(&self.config, &self.upgrader).await?;
        let result = self.drive(&mut session, envelope, &data).await;
        session.close().await;

        match &result {
            Ok(()) => info!(
                host = %self.config.host,
                recipient = %envelope.to,
                "test message accepted"
            ),
            Err(err) => warn!(host = %self.config.host, error = %err, "submission failed"),
        }
        result
    }

    /// Runs every step of the plan on an open session.
    async fn drive(&self, session: &mut Session, envelope: &Envelope, data: &[u8]) -> Result<()> {
        for step in Step::sequence(self.config.encryption) {
            self.perform(step, session, envelope, data).await?;
        }
        Ok(())
    }

    async fn perform(
        &self,
        step: Step,
        session: &mut Session,
        envelope: &Envelope,
        data: &[u8],
    ) -> Result<()> {
        match step {
            Step::Greeting => session.greeting().await,
            Step::Ehlo | Step::EhloAfterTls => session.ehlo(step).await,
            Step::StartTls => session.start_tls(&self.upgrader).await,
            Step::AuthStart => {
                if !session.server_info().supports_auth_login() {
                    debug!("AUTH LOGIN not advertised; trying anyway");
                }
                let command = Command::Auth {
                    mechanism: AuthMechanism::Login,
                };
                session.exchange(step, &command).await.map(drop)
            }
            Step::AuthUsername => {
                let command = Command::AuthResponse(self.credentials.encoded_username());
                session.exchange(step, &command).await.map(drop)
            }
            Step::AuthPassword => {
                let command = Command::AuthResponse(self.credentials.encoded_password());
                session.exchange(step, &command).await.map(drop)
            }
            Step::MailFrom => {
                if let Some(limit) = session.server_info().max_message_size() {
                    if limit > 0 && data.len() > limit {
                        return Err(Error::MessageTooLarge {
                            size: data.len(),
                            limit,
                        });
                    }
                }
                let command = Command::MailFrom {
                    from: envelope.from.address.clone(),
                };
                session.exchange(step, &command).await.map(drop)
            }
            Step::RcptTo => {
                let command = Command::RcptTo {
                    to: envelope.to.clone(),
                };
                session.exchange(step, &command).await.map(drop)
            }
            Step::DataStart => session.exchange(step, &Command::Data).await.map(drop),
            Step::Body => {
                session.write_data(data).await?;
                session.write_line(DATA_TERMINATOR).await?;
                session.expect(step).await.map(drop)
            }
            Step::Quit => {
                session.quit().await;
                Ok(())
            }
        }
    }
}
