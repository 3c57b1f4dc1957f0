//! Outbound e-mail abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A rendered e-mail ready to hand to the delivery function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// Delivers e-mail through an external provider.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send one message. Delivery failures surface as
    /// `ExternalService` or `RateLimit` errors.
    async fn send(&self, message: &OutboundEmail) -> AppResult<()>;
}
