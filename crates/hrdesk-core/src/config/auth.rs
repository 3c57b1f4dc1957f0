//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// `iss` claim written into and required on every token.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// `aud` claim expected by the data platform.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    /// Token lifetime in minutes.
    #[serde(default = "default_ttl")]
    pub jwt_ttl_minutes: u64,
    /// PBKDF2 iteration count for newly hashed passwords.
    #[serde(default = "default_iterations")]
    pub pbkdf2_iterations: u32,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Consecutive failed sign-ins before the account is locked.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Lockout window in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
    /// Lifetime of a password reset token in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
    /// Lifetime of the set-password link sent to invited employees, in hours.
    #[serde(default = "default_invitation_ttl")]
    pub invitation_ttl_hours: u64,
    /// Base URL deep links are built on (e.g. `hrdesk://app/`).
    #[serde(default = "default_link_base")]
    pub deep_link_base: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            jwt_audience: default_audience(),
            jwt_ttl_minutes: default_ttl(),
            pbkdf2_iterations: default_iterations(),
            password_min_length: default_password_min(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
            reset_token_ttl_minutes: default_reset_ttl(),
            invitation_ttl_hours: default_invitation_ttl(),
            deep_link_base: default_link_base(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION_0123456789abcdef".to_string()
}

fn default_issuer() -> String {
    "hrdesk".to_string()
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_ttl() -> u64 {
    24 * 60
}

fn default_iterations() -> u32 {
    210_000
}

fn default_password_min() -> usize {
    8
}

fn default_max_failed() -> i32 {
    5
}

fn default_lockout() -> u64 {
    15
}

fn default_reset_ttl() -> u64 {
    60
}

fn default_invitation_ttl() -> u64 {
    72
}

fn default_link_base() -> String {
    "hrdesk://app/".to_string()
}
