//! Recipe Box CLI - Database migrations and user inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the schema (users, recipes, sessions)
//! rb-cli migrate
//!
//! # List everyone who has logged in
//! rb-cli users list
//!
//! # Show one user and their saved recipe count
//! rb-cli users show cook@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rb-cli")]
#[command(author, version, about = "Recipe Box CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (application tables and session store)
    Migrate,
    /// Inspect users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List all users, oldest first
    List,
    /// Show a single user by email
    Show {
        /// The user's email address
        email: String,
    },
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
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list().await?,
            UsersAction::Show { email } => commands::users::show(&email).await?,
        },
    }
    Ok(())
}
