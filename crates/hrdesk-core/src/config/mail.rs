//! Outbound e-mail configuration.

use serde::{Deserialize, Serialize};

/// Settings for the transactional e-mail HTTP function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// When disabled, messages are logged and dropped.
    #[serde(default)]
    pub enabled: bool,
    /// HTTP endpoint receiving the JSON message.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token for the endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    #[serde(default = "default_from")]
    pub from: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            api_key: String::new(),
            from: default_from(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_from() -> String {
    "HRDesk <no-reply@hrdesk.app>".to_string()
}

fn default_timeout() -> u64 {
    10
}
