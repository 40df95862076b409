//! Database migration command.
//!
//! Applies the embedded migrations from `crates/web/migrations/` and creates
//! the `tower_sessions` schema used by the session store.
//!
//! # Environment Variables
//!
//! - `RECIPE_BOX_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running application migrations...");
    recipe_box_web::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
