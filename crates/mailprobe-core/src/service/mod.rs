//! Delivery services.
//!
//! This module decides between the SMTP relay and the HTTP mail API and
//! turns either outcome into a single report.

pub mod http;
pub mod probe;

pub use http::{HttpMailTransport, HttpMessage, HttpTransportError};
pub use probe::{Mailer, select_transport};
