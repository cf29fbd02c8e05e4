//! Transport selection and the test-send entry point.

use mailprobe_smtp::{
    Address, Category, Engine, Envelope, RustlsUpgrader, Upgrader, classify,
};
use tracing::{debug, info, warn};

use super::http::{HttpMailTransport, HttpMessage};
use crate::catalog::MessageCatalog;
use crate::report::{OutcomeReport, TransportKind};
use crate::settings::{RelaySettings, TestRequest, validate_request};

/// Picks the delivery path for a request.
///
/// The relay is used only when it is enabled; everything else goes through
/// the HTTP mail API.
#[must_use]
pub const fn select_transport(settings: &RelaySettings) -> TransportKind {
    if settings.enabled {
        TransportKind::Smtp
    } else {
        TransportKind::Http
    }
}

/// Sends test messages and reports the outcome.
///
/// Holds no per-request state; concurrent calls each get their own
/// connection.
#[derive(Debug, Clone)]
pub struct Mailer<H, U = RustlsUpgrader> {
    http: H,
    upgrader: U,
    catalog: MessageCatalog,
}

impl<H: HttpMailTransport> Mailer<H, RustlsUpgrader> {
    /// Creates a mailer verifying relay TLS against the bundled web PKI
    /// roots.
    #[must_use]
    pub fn new(http: H) -> Self {
        Self::with_upgrader(http, RustlsUpgrader::new())
    }
}

impl<H: HttpMailTransport, U: Upgrader + Clone> Mailer<H, U> {
    /// Creates a mailer with a custom TLS upgrader.
    #[must_use]
    pub fn with_upgrader(http: H, upgrader: U) -> Self {
        Self {
            http,
            upgrader,
            catalog: MessageCatalog::default(),
        }
    }

    /// Replaces the message catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sends one test message and reports what happened.
    ///
    /// Never fails: every error is classified into the report.
    pub async fn send_test_email(&self, request: &TestRequest) -> OutcomeReport {
        let transport = select_transport(&request.relay_settings);
        debug!(%transport, recipient = %request.recipient_address, "sending test email");

        match transport {
            TransportKind::Smtp => self.send_via_relay(request).await,
            TransportKind::Http => self.send_via_http(request).await,
        }
    }

    async fn send_via_relay(&self, request: &TestRequest) -> OutcomeReport {
        if let Err(errors) = validate_request(request) {
            let technical = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%technical, "relay settings rejected");
            return self.failure(TransportKind::Smtp, Category::Configuration, technical);
        }

        let envelope = match self.envelope(request) {
            Ok(envelope) => envelope,
            Err(err) => {
                return self.failure(
                    TransportKind::Smtp,
                    classify(&err).category,
                    err.to_string(),
                );
            }
        };

        let settings = &request.relay_settings;
        let engine = Engine::with_upgrader(
            settings.session_config(),
            settings.credentials(),
            self.upgrader.clone(),
        );

        match engine.submit(&envelope).await {
            Ok(()) => OutcomeReport::success(TransportKind::Smtp, self.catalog.success.as_str()),
            Err(err) => {
                let diagnosis = classify(&err);
                self.failure(TransportKind::Smtp, diagnosis.category, diagnosis.technical)
            }
        }
    }

    async fn send_via_http(&self, request: &TestRequest) -> OutcomeReport {
        let message = HttpMessage {
            to: request.recipient_address.trim().to_string(),
            subject: self.catalog.test_subject.clone(),
            html_body: self.catalog.test_body.clone(),
        };

        match self.http.send(&message).await {
            Ok(()) => {
                info!(recipient = %message.to, "test message accepted by mail API");
                OutcomeReport::success(TransportKind::Http, self.catalog.success.as_str())
            }
            Err(err) => {
                warn!(error = %err, "mail API send failed");
                OutcomeReport::failure(
                    TransportKind::Http,
                    Category::Connection,
                    self.catalog.http_failure.as_str(),
                    err.to_string(),
                )
            }
        }
    }

    /// The default test message: settings' sender to the requested
    /// recipient.
    fn envelope(&self, request: &TestRequest) -> mailprobe_smtp::Result<Envelope> {
        Ok(Envelope::new(
            request.relay_settings.sender()?,
            Address::new(request.recipient_address.as_str())?,
            self.catalog.test_subject.as_str(),
            self.catalog.test_body.as_str(),
        ))
    }

    fn failure(
        &self,
        transport: TransportKind,
        category: Category,
        technical: String,
    ) -> OutcomeReport {
        OutcomeReport::failure(
            transport,
            category,
            self.catalog.summary(category),
            technical,
        )
    }
}
