//! Outbound e-mail through the transactional mail function.

pub mod http;

pub use http::HttpMailer;
