//! # mailprobe-core
//!
//! Application boundary for the relay probe.
//!
//! This crate provides:
//! - Relay settings and test requests, with pre-flight validation
//! - The outcome report returned to the caller
//! - A message catalog for localised summaries
//! - Transport selection between the SMTP relay and an HTTP mail API

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod catalog;
mod error;
pub mod report;
pub mod service;
pub mod settings;

pub use catalog::MessageCatalog;
pub use error::{Error, Result};
pub use mailprobe_smtp::{Category, EncryptionMode};
pub use report::{OutcomeReport, TransportKind};
pub use service::{
    HttpMailTransport, HttpMessage, HttpTransportError, Mailer, select_transport,
};
pub use settings::{
    RelaySettings, TestRequest, ValidationError, ValidationResult, validate_request,
};
