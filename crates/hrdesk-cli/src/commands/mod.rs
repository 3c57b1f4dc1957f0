//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod reset;
pub mod serve;
pub mod session;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use hrdesk_auth::AuthManager;
use hrdesk_auth::store::{PgAccountStore, PgRoleStore};
use hrdesk_core::config::AppConfig;
use hrdesk_core::error::AppError;
use hrdesk_database::DatabasePool;
use hrdesk_service::HttpMailer;

use crate::output::OutputFormat;

/// HRDesk: multi-tenant HR management backend
#[derive(Debug, Parser)]
#[command(name = "hrdesk", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HRDesk API server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Account administration
    User(user::UserArgs),
    /// Sign in and out on this machine
    Session(session::SessionArgs),
    /// Password reset by e-mail link
    Reset(reset::ResetArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config, self.format).await,
            Commands::User(args) => user::execute(args, &self.config, self.format).await,
            Commands::Session(args) => session::execute(args, &self.config, self.format).await,
            Commands::Reset(args) => reset::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config).await,
        }
    }
}

/// Helper: load and validate configuration from file plus environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: connect to the configured database
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: auth manager over the Postgres stores and the configured mailer
pub fn create_auth_manager(
    config: &AppConfig,
    db: &DatabasePool,
) -> Result<Arc<AuthManager>, AppError> {
    let mailer = Arc::new(HttpMailer::new(&config.mail)?);
    Ok(Arc::new(AuthManager::new(
        &config.auth,
        Arc::new(PgAccountStore::new(db.pool().clone())),
        Arc::new(PgRoleStore::new(db.pool().clone())),
        mailer,
    )))
}

/// Helper: read a password from the argument or an interactive prompt
pub fn read_password(
    provided: Option<&str>,
    prompt: &str,
    confirm: bool,
) -> Result<String, AppError> {
    if let Some(p) = provided {
        return Ok(p.to_string());
    }
    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
