//! One-time password reset tokens and the e-mails that carry them.

pub mod email;
pub mod token;

pub use token::ResetToken;
