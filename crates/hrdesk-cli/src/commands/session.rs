//! Local sign-in state for the CLI user.

use std::sync::Arc;

use clap::{Args, Subcommand};

use hrdesk_auth::client::FileSessionStore;
use hrdesk_auth::{AuthSession, SessionState};
use hrdesk_core::config::AppConfig;
use hrdesk_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Sign in and remember the session on this machine
    Login {
        /// Sign-in e-mail
        #[arg(short, long)]
        email: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let session = open_session(&config, &db)?;

    let result = match &args.command {
        SessionCommand::Login { email, password } => {
            let password = super::read_password(password.as_deref(), "Password", false)?;
            let state = session.sign_in(email, &password).await;
            state.map(|state| print_state(&state, format))
        }
        SessionCommand::Logout => {
            if session.restore().await.is_signed_in() {
                session.sign_out().await;
                output::print_success("Signed out");
            } else {
                output::print_warning("No one is signed in");
            }
            Ok(())
        }
        SessionCommand::Whoami => {
            let state = session.restore().await;
            print_state(&state, format);
            Ok(())
        }
    };

    db.close().await;
    result
}

/// Client session persisted to the configured session file
pub(crate) fn open_session(
    config: &AppConfig,
    db: &hrdesk_database::DatabasePool,
) -> Result<AuthSession, AppError> {
    let manager = super::create_auth_manager(config, db)?;
    let store = Arc::new(FileSessionStore::new(&config.client.session_file));
    Ok(AuthSession::new(manager, store))
}

fn print_state(state: &SessionState, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(state);
        return;
    }

    match state {
        SessionState::SignedOut => output::print_warning("Not signed in"),
        SessionState::SignedIn {
            user,
            principal,
            expires_at,
            ..
        } => {
            output::print_success(&format!("Signed in as {}", user.email));
            output::print_kv("Role", principal.role.as_str());
            if let Some(company_id) = principal.company_id {
                output::print_kv("Company", &company_id.to_string());
            }
            output::print_kv(
                "Session expires",
                &expires_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            );
        }
    }
}
