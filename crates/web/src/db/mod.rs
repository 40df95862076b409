//! Persistence for Recipe Box.
//!
//! # Tables
//!
//! - `users` - One row per Google account that has logged in (unique `email`)
//! - `recipes` - Saved recipes; `recipes.user_id` references `users.id`
//! - `tower_sessions.session` - Session storage owned by `tower-sessions-sqlx-store`
//!
//! # Store seams
//!
//! Handlers never touch `PgPool` directly for domain data. They go through the
//! [`UserStore`] and [`RecipeStore`] traits so the application state can hold
//! `Arc<dyn ...>` handles: the `PostgreSQL` repositories in production and
//! in-memory stores in the integration tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p recipe-box-cli -- migrate
//! ```

pub mod recipes;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use recipe_box_core::{Email, UserId};

use crate::models::recipe::{Recipe, RecipeCandidate};
use crate::models::user::{NewUser, User};

pub use recipes::RecipeRepository;
pub use users::UserRepository;

/// Embedded schema migrations for the `users` and `recipes` tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Errors surfaced by the recipe box operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A recipe with this name is already saved (names are unique across all users).
    #[error("a recipe named '{0}' is already saved")]
    DuplicateName(String),

    /// No recipe with this name exists in the caller's recipe box.
    #[error("recipe not found")]
    NotFound,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Identity store: persisted users keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load a user by primary key.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Load a user by their (unique) email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Create the user if the email is new, otherwise overwrite name, avatar and tokens.
    ///
    /// Must be a single atomic operation so concurrent logins for the same
    /// email never produce two rows.
    async fn upsert(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// All users, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Recipe store: each user's saved recipes.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Persist a search candidate into `owner`'s recipe box.
    async fn save(&self, owner: UserId, candidate: &RecipeCandidate)
    -> Result<Recipe, StoreError>;

    /// Every recipe owned by `owner`, in save order. Empty is not an error.
    async fn list_for_user(&self, owner: UserId) -> Result<Vec<Recipe>, StoreError>;

    /// Delete the recipe called `name` from `owner`'s box.
    ///
    /// Recipes owned by other users are never touched; if `owner` has no
    /// recipe by that name the result is [`StoreError::NotFound`].
    async fn remove(&self, owner: UserId, name: &str) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, turning unique violations into `Conflict`.
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
