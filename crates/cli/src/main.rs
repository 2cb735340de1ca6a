//! user-apis CLI - Database migrations, admin seeding and diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ua-cli migrate
//!
//! # Create an admin
//! ua-cli admin create -e admin@example.com -p 'Str0ngPassword'
//!
//! # Check database connectivity
//! ua-cli db check
//!
//! # Smoke test a running server
//! ua-cli smoke --base-url http://localhost:3000 --data crates/cli/fixtures/smoke-data.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "ua-cli")]
#[command(author, version, about = "user-apis CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Database diagnostics
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Exercise the API of a running server
    Smoke {
        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        base_url: Url,

        /// JSON fixture with sample users and validation cases
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Connect and run a write/read/delete round trip
    Check,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => {
                commands::admin::create(&email, &password).await?;
            }
        },
        Commands::Db { action } => match action {
            DbAction::Check => commands::db::check().await?,
        },
        Commands::Smoke { base_url, data } => {
            commands::smoke::run(&base_url, data.as_deref()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_admin_create() {
        let cli = Cli::try_parse_from([
            "ua-cli", "admin", "create", "-e", "a@x.com", "-p", "Password123",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Create { .. }
            })
        ));
    }

    #[test]
    fn test_smoke_rejects_bad_url() {
        assert!(Cli::try_parse_from(["ua-cli", "smoke", "--base-url", "not a url"]).is_err());
    }
}
