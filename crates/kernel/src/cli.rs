//! Command-line interface for the `atelier` binary.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::models::{CreateUser, ROLE_ADMIN, User};
use crate::store::UserStore;

/// Minimum password length accepted for administrator accounts.
pub const MIN_ADMIN_PASSWORD_LEN: usize = 8;

/// Atelier editable-content server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Create an administrator account.
    CreateAdmin {
        /// Login email of the new administrator.
        #[arg(long)]
        email: String,

        /// Initial password.
        #[arg(long)]
        password: String,
    },
}

impl Cli {
    /// The subcommand to run, defaulting to `serve`.
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}

/// Create an administrator, refusing duplicates and weak input.
pub async fn create_admin(users: &dyn UserStore, email: &str, password: &str) -> Result<User> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        bail!("a valid email address is required");
    }
    if password.len() < MIN_ADMIN_PASSWORD_LEN {
        bail!("password must be at least {MIN_ADMIN_PASSWORD_LEN} characters");
    }
    if users.find_user_by_email(email).await?.is_some() {
        bail!("a user with email {email} already exists");
    }

    let user = users
        .create_user(CreateUser {
            email: email.to_string(),
            password: password.to_string(),
            role: ROLE_ADMIN.to_string(),
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "administrator created");
    Ok(user)
}
