//! Core SMTP types.

mod address;
mod credentials;
mod extension;
mod reply;

pub use address::{Address, Mailbox};
pub use credentials::Credentials;
pub use extension::{AuthMechanism, Extension};
pub use reply::{Reply, ReplyCode};
