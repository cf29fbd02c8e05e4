//! # mailprobe-smtp
//!
//! A single-shot SMTP submission client for checking outbound relay
//! settings end to end.
//!
//! ## Features
//!
//! - **Explicit handshake table**: every step and the reply codes it accepts
//!   live in [`engine::Step`]
//! - **TLS support**: both implicit TLS (port 465) and STARTTLS (port 587),
//!   with capability re-discovery after the upgrade
//! - **Authentication**: AUTH LOGIN
//! - **Classified failures**: [`classify()`] maps any error to a small set of
//!   user-facing categories while keeping the technical text
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailprobe_smtp::{Address, Credentials, Engine, Envelope, Mailbox, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> mailprobe_smtp::Result<()> {
//!     let config = SessionConfig::builder("smtp.example.com").port(587).build();
//!     let engine = Engine::new(config, Credentials::new("user", "secret"));
//!
//!     let envelope = Envelope::new(
//!         Mailbox::with_name("Ops", "ops@example.com")?,
//!         Address::new("admin@example.com")?,
//!         "Relay test",
//!         "<p>It works.</p>",
//!     );
//!
//!     engine.submit(&envelope).await
//! }
//! ```
//!
//! ## Handshake
//!
//! ```text
//! greeting ─→ EHLO ─┬──────────────────────────────┬─→ AUTH LOGIN ─→ user ─→ pass
//!                   └─→ STARTTLS ─→ EHLO (again) ──┘
//!   ─→ MAIL FROM ─→ RCPT TO ─→ DATA ─→ body + "." ─→ QUIT
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Line transport, TLS upgrade and session handle
//! - [`engine`]: Step table and protocol engine
//! - [`parser`]: Reply parser
//! - [`types`]: Core SMTP types (addresses, extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod classify;
pub mod command;
pub mod connection;
pub mod engine;
mod error;
pub mod message;
pub mod parser;
pub mod types;

pub use classify::{Category, Diagnosis, classify};
pub use connection::{
    EncryptionMode, RustlsUpgrader, ServerInfo, Session, SessionConfig, Upgrader,
};
pub use engine::{Engine, Step};
pub use error::{Error, Result};
pub use message::Envelope;
pub use types::{Address, AuthMechanism, Credentials, Extension, Mailbox, Reply, ReplyCode};
