//! [`Mailer`] that POSTs JSON to an HTTP mail endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

use hrdesk_core::config::MailConfig;
use hrdesk_core::error::{AppError, ErrorKind};
use hrdesk_core::result::AppResult;
use hrdesk_core::traits::{Mailer, OutboundEmail};

/// Request body understood by the mail function.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sends mail through the configured endpoint. When mail is disabled,
/// messages are logged and dropped.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    /// Build a mailer from configuration.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Whether messages are actually delivered.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &OutboundEmail) -> AppResult<()> {
        if !self.config.enabled {
            info!(to = %message.to, subject = %message.subject, "Mail disabled, message dropped");
            return Ok(());
        }

        let body = SendRequest {
            from: &self.config.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Mail endpoint unreachable", e)
            })?;

        let status = response.status();
        if status.is_success() {
            info!(to = %message.to, subject = %message.subject, "Mail sent");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), detail = %detail, "Mail endpoint rejected message");
        Err(status_error(status))
    }
}

/// Map a non-2xx response from the mail endpoint.
fn status_error(status: StatusCode) -> AppError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        AppError::rate_limit("Too many e-mails sent. Try again later.")
    } else {
        AppError::external_service(format!("Mail endpoint responded with {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_error(StatusCode::TOO_MANY_REQUESTS).kind, ErrorKind::RateLimit);
        assert_eq!(status_error(StatusCode::BAD_GATEWAY).kind, ErrorKind::ExternalService);
        assert_eq!(status_error(StatusCode::UNAUTHORIZED).kind, ErrorKind::ExternalService);
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendRequest {
            from: "HRDesk <no-reply@hrdesk.app>",
            to: ["ola@firma.no"],
            subject: "Hei",
            html: "<p>Hei</p>",
            text: "Hei",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "ola@firma.no");
        assert_eq!(json["from"], "HRDesk <no-reply@hrdesk.app>");
    }

    #[tokio::test]
    async fn test_disabled_mailer_drops_messages() {
        let mailer = HttpMailer::new(&MailConfig::default()).unwrap();
        assert!(!mailer.is_enabled());
        let message = OutboundEmail {
            to: "ola@firma.no".to_string(),
            subject: "Hei".to_string(),
            html: String::new(),
            text: String::new(),
        };
        assert!(mailer.send(&message).await.is_ok());
    }
}
