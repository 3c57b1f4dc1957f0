//! Account administration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use hrdesk_auth::SignUp;
use hrdesk_core::error::AppError;
use hrdesk_core::types::PageRequest;
use hrdesk_database::{AdminRepository, UserRepository};
use hrdesk_entity::user::{User, UserStatus};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List accounts
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Accounts per page
        #[arg(long, default_value_t = 25)]
        per_page: u64,
    },
    /// Create an account, optionally together with a new company it administers
    Create {
        /// Sign-in e-mail
        #[arg(short, long)]
        email: String,
        /// Full name
        #[arg(short = 'n', long)]
        full_name: Option<String>,
        /// Create this company with the account as its admin
        #[arg(long)]
        company: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Grant super-admin rights to an existing account
    MakeAdmin {
        /// Account e-mail
        email: String,
    },
    /// List super admins
    Admins,
    /// Change an account's status (active, inactive, locked)
    SetStatus {
        /// Account e-mail
        email: String,
        /// New status
        status: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    full_name: String,
    status: String,
    last_login: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email.clone(),
            full_name: u.full_name.clone().unwrap_or_default(),
            status: u.status.to_string(),
            last_login: u
                .last_login_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct AdminRow {
    user_id: String,
    full_name: String,
    since: String,
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::create_db_pool(&config).await?;
    let users = UserRepository::new(db.pool().clone());

    match &args.command {
        UserCommand::List { page, per_page } => {
            let result = users.find_all(&PageRequest::new(*page, *per_page)).await?;
            let rows: Vec<UserRow> = result.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {} of {} ({} accounts)",
                    result.page, result.total_pages, result.total_items
                );
            }
        }
        UserCommand::Create {
            email,
            full_name,
            company,
            password,
        } => {
            let password = super::read_password(password.as_deref(), "Password", true)?;
            let auth = super::create_auth_manager(&config, &db)?;
            let user = match company {
                Some(company) => {
                    auth.sign_up(&SignUp {
                        email: email.clone(),
                        password,
                        full_name: full_name.clone(),
                        company_name: company.clone(),
                    })
                    .await?
                }
                None => {
                    auth.create_account(email, &password, full_name.as_deref())
                        .await?
                }
            };

            output::print_success(&format!("Account '{}' created (id: {})", user.email, user.id));
            if company.is_none() {
                output::print_warning(
                    "The account has no role yet; attach it to a company or run `user make-admin`",
                );
            }
        }
        UserCommand::MakeAdmin { email } => {
            let user = find_user(&users, email).await?;
            AdminRepository::new(db.pool().clone())
                .create(user.id, user.full_name.as_deref())
                .await?;
            output::print_success(&format!("'{}' is now a super admin", user.email));
        }
        UserCommand::Admins => {
            let admins = AdminRepository::new(db.pool().clone()).find_all().await?;
            let rows: Vec<AdminRow> = admins
                .iter()
                .map(|a| AdminRow {
                    user_id: a.user_id.to_string(),
                    full_name: a.full_name.clone().unwrap_or_default(),
                    since: a.created_at.format("%Y-%m-%d").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::SetStatus { email, status } => {
            let status: UserStatus = status.parse()?;
            let user = find_user(&users, email).await?;
            users.update_status(user.id, status).await?;
            output::print_success(&format!("'{}' is now {status}", user.email));
        }
    }

    db.close().await;
    Ok(())
}

async fn find_user(users: &UserRepository, email: &str) -> Result<User, AppError> {
    users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No account with e-mail '{email}'")))
}
