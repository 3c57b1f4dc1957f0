//! Core traits defined in `hrdesk-core` and implemented by other crates.

pub mod mailer;

pub use mailer::{Mailer, OutboundEmail};
