//! Configuration inspection commands.

use clap::{Args, Subcommand};

use hrdesk_core::error::AppError;
use hrdesk_database::connection::mask_password;

use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate the configuration file and environment
    Validate,
}

const MASK: &str = "****";

/// Execute config commands
pub async fn execute(args: &ConfigArgs, config_path: &str) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = super::load_config(config_path)?;
            config.auth.jwt_secret = MASK.to_string();
            if !config.mail.api_key.is_empty() {
                config.mail.api_key = MASK.to_string();
            }
            config.database.url = mask_password(&config.database.url);
            output::print_json(&config);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                output::print_kv("Server", &config.server.bind_address());
                output::print_kv("Database", &mask_password(&config.database.url));
                output::print_kv(
                    "Mail",
                    if config.mail.enabled {
                        config.mail.endpoint.as_str()
                    } else {
                        "disabled"
                    },
                );
                output::print_kv("Reset links", &config.auth.deep_link_base);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
