//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `HRDESK__`-prefixed environment variables. Every section
//! has defaults so a missing file still yields a usable configuration.

pub mod app;
pub mod auth;
pub mod client;
pub mod database;
pub mod logging;
pub mod mail;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, RateLimitConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::client::ClientConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::mail::MailConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Outbound e-mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Request rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Local client session settings (CLI).
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml` and environment
    /// variables prefixed with `HRDESK__` (nested keys separated by `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        Self::finish(builder)
    }

    /// Load configuration from an explicit file path plus environment
    /// variables.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("HRDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations that would run with unsafe or unusable values.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 32 characters",
            ));
        }
        if self.auth.pbkdf2_iterations < 10_000 {
            return Err(AppError::configuration(
                "auth.pbkdf2_iterations must be at least 10000",
            ));
        }
        if self.mail.enabled && self.mail.endpoint.is_empty() {
            return Err(AppError::configuration(
                "mail.endpoint is required when mail is enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.reset_token_ttl_minutes, 60);
        assert_eq!(config.auth.jwt_audience, "authenticated");
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "short".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_enabled_mail_requires_endpoint() {
        let mut config = AppConfig::default();
        config.mail.enabled = true;
        config.mail.endpoint.clear();
        assert!(config.validate().is_err());
    }
}
