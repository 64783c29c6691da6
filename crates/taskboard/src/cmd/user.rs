//! User command - manage accounts in the local database
//!
//! # Usage
//!
//! ```bash
//! taskboard user add --email ada@example.com --name Ada --role admin --password '...'
//! taskboard user list
//! taskboard user set-role --email mia@example.com --role admin
//! taskboard user remove --email mia@example.com
//! ```
//!
//! Role changes and removals apply to existing sessions on their next
//! request; no token needs to be revoked.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use taskboard_auth::{LocalUserStore, Role, StoredUser};
use taskboard_config::Config;

use crate::cmd::serve::ensure_parent_dir;

/// Minimum password length accepted by `user add`
const MIN_PASSWORD_LENGTH: usize = 8;

/// User command arguments
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account
    Add {
        /// Login email (unique)
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Role (member, admin)
        #[arg(long, default_value = "member", value_parser = parse_role)]
        role: Role,

        /// Initial password
        #[arg(long)]
        password: String,
    },

    /// List accounts
    List,

    /// Change the role of an account
    SetRole {
        /// Login email
        #[arg(long)]
        email: String,

        /// New role (member, admin)
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },

    /// Delete an account
    Remove {
        /// Login email
        #[arg(long)]
        email: String,
    },
}

/// Run the user command
pub async fn run(args: UserArgs, config: &Config) -> Result<()> {
    ensure_parent_dir(&config.storage.db_path)?;
    let store = LocalUserStore::open(&config.storage.db_path)
        .await
        .context("failed to open user store")?;

    match args.command {
        UserCommand::Add {
            email,
            name,
            role,
            password,
        } => {
            if password.len() < MIN_PASSWORD_LENGTH {
                bail!("password must be at least {} characters", MIN_PASSWORD_LENGTH);
            }
            let user = store.create_user(name.trim(), email.trim(), &password, role).await?;
            println!("Created {} ({}) with id {}", user.email, user.role, user.id);
        }
        UserCommand::List => {
            let users = store.list_users().await?;
            if users.is_empty() {
                println!("No users");
            }
            for user in users {
                println!("{}", format_user(&user));
            }
        }
        UserCommand::SetRole { email, role } => {
            let user = find_user(&store, &email).await?;
            store.set_role(&user.id, role).await?;
            println!("{} is now {}", user.email, role);
        }
        UserCommand::Remove { email } => {
            let user = find_user(&store, &email).await?;
            store.delete_user(&user.id).await?;
            println!("Removed {}", user.email);
        }
    }

    Ok(())
}

/// Command-line role, case-insensitive
fn parse_role(s: &str) -> std::result::Result<Role, String> {
    Role::parse(&s.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown role '{}', expected member or admin", s))
}

async fn find_user(store: &LocalUserStore, email: &str) -> Result<StoredUser> {
    store
        .get_by_email(email.trim())
        .await?
        .with_context(|| format!("no user with email {}", email))
}

fn format_user(user: &StoredUser) -> String {
    format!(
        "{:<36}  {:<6}  {:<30}  {}",
        user.id,
        user.role.as_str(),
        user.email,
        user.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("admin"), Ok(Role::Admin));
        assert_eq!(parse_role("Member"), Ok(Role::Member));
        assert_eq!(parse_role(" ADMIN "), Ok(Role::Admin));
        assert!(parse_role("owner").is_err());
        assert!(parse_role("user").is_err());
    }
}
