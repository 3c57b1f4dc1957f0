//! Password reset from the command line.

use clap::{Args, Subcommand};

use hrdesk_core::error::AppError;
use hrdesk_core::types::DeepLink;

use crate::output;

/// Arguments for reset commands
#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Reset subcommand
    #[command(subcommand)]
    pub command: ResetCommand,
}

/// Reset subcommands
#[derive(Debug, Subcommand)]
pub enum ResetCommand {
    /// E-mail a reset link to an account
    Request {
        /// Account e-mail
        email: String,
    },
    /// Set a new password using the link (or bare token) from the e-mail
    Confirm {
        /// Reset link or token
        link: String,
        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Execute reset commands
pub async fn execute(args: &ResetArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let session = super::session::open_session(&config, &db)?;

    let result = match &args.command {
        ResetCommand::Request { email } => session
            .request_password_reset(email)
            .await
            .map(|()| {
                output::print_success(
                    "If an account exists for that address, a reset link is on its way",
                )
            }),
        ResetCommand::Confirm { link, password } => {
            let token = reset_token(link, &config.auth.deep_link_base)?;
            let password = super::read_password(password.as_deref(), "New password", true)?;
            session
                .reset_password(&token, &password)
                .await
                .map(|()| output::print_success("Password updated. You can now sign in."))
        }
    };

    db.close().await;
    result
}

/// Token carried by a reset link, or the input itself when it is not a URL.
fn reset_token(input: &str, link_base: &str) -> Result<String, AppError> {
    if !input.contains("://") {
        return Ok(input.trim().to_string());
    }
    match DeepLink::parse(input, link_base)? {
        DeepLink::ResetPassword { token } => Ok(token),
        other => Err(AppError::validation(format!(
            "Expected a password reset link, got a {} link",
            other.screen()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "hrdesk://app/";

    #[test]
    fn test_token_from_link() {
        let token = reset_token("hrdesk://app/reset-password?token=abc123", BASE).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn test_bare_token_passes_through() {
        assert_eq!(reset_token("  abc123 \n", BASE).unwrap(), "abc123");
    }

    #[test]
    fn test_other_links_rejected() {
        assert!(reset_token("hrdesk://app/profile", BASE).is_err());
        assert!(reset_token("https://elsewhere.example.com/reset-password?token=x", BASE).is_err());
    }
}
