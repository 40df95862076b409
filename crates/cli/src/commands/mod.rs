//! CLI command implementations.

pub mod migrate;
pub mod users;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] recipe_box_web::db::RepositoryError),

    /// Recipe store error.
    #[error("Recipe store error: {0}")]
    Store(#[from] recipe_box_web::db::StoreError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid email argument.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] recipe_box_core::EmailError),

    /// No user with that email.
    #[error("No user with email {0}")]
    UserNotFound(String),
}

/// Connect using `RECIPE_BOX_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("RECIPE_BOX_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("RECIPE_BOX_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(recipe_box_web::db::create_pool(&SecretString::from(database_url)).await?)
}
