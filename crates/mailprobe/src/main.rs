//! `mailprobe` - send one test email through an SMTP relay
//!
//! Reads a JSON test request, sends the test message and prints the outcome report
//! as JSON on stdout. Logs go to stderr.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use mailprobe_core::{
    HttpMailTransport, HttpMessage, HttpTransportError, Mailer, MessageCatalog, TestRequest,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Args;

const DEFAULT_LOG_FILTER: &str = "mailprobe=info,mailprobe_core=info,mailprobe_smtp=info";

/// Stands in for the HTTP mail API, which only exists inside the host
/// application.
struct NoHttpApi;

impl HttpMailTransport for NoHttpApi {
    async fn send(&self, _message: &HttpMessage) -> Result<(), HttpTransportError> {
        Err(HttpTransportError::new(
            "no HTTP mail API configured; enable the relay to test it",
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let request: TestRequest =
        serde_json::from_str(&read_request(&args)?).context("parsing test request")?;

    let catalog = match &args.catalog {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            MessageCatalog::from_json(&json)
                .with_context(|| format!("parsing catalog {}", path.display()))?
        }
        None => MessageCatalog::default(),
    };

    info!(
        relay = request.relay_settings.enabled,
        host = %request.relay_settings.host,
        "Sending test email"
    );

    let mailer = Mailer::new(NoHttpApi).with_catalog(catalog);
    let report = mailer.send_test_email(&request).await;
    debug!(?report, "test send finished");

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_request(args: &Args) -> anyhow::Result<String> {
    if args.request_from_stdin() {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("reading test request from stdin")?;
        return Ok(json);
    }

    std::fs::read_to_string(&args.request)
        .with_context(|| format!("reading test request {}", args.request.display()))
}
