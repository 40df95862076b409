//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::RecipeBoxConfig;
use crate::db::{RecipeRepository, RecipeStore, UserRepository, UserStore};
use crate::services::auth::AuthManager;
use crate::services::oauth::GoogleClient;
use crate::services::search::RecipeSearch;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores are trait objects so the same router
/// runs against `PostgreSQL` in production and in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    recipes: Arc<dyn RecipeStore>,
    auth: AuthManager,
    search: RecipeSearch,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create state backed by `PostgreSQL` repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if an outbound HTTP client cannot be built.
    pub fn new(config: RecipeBoxConfig, pool: PgPool) -> Result<Self, StateError> {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let recipes = Arc::new(RecipeRepository::new(pool.clone()));
        Self::with_stores(config, users, recipes, Some(pool))
    }

    /// Create state over arbitrary stores.
    ///
    /// `pool` is only used by the readiness probe; pass `None` when the
    /// stores are not database-backed.
    ///
    /// # Errors
    ///
    /// Returns an error if an outbound HTTP client cannot be built.
    pub fn with_stores(
        config: RecipeBoxConfig,
        users: Arc<dyn UserStore>,
        recipes: Arc<dyn RecipeStore>,
        pool: Option<PgPool>,
    ) -> Result<Self, StateError> {
        let google = GoogleClient::new(&config)?;
        let search = RecipeSearch::new(&config)?;
        let auth = AuthManager::new(users, google);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                recipes,
                auth,
                search,
                pool,
            }),
        })
    }

    /// Login flow and session-to-user mapping.
    #[must_use]
    pub fn auth(&self) -> &AuthManager {
        &self.inner.auth
    }

    /// The recipe box store.
    #[must_use]
    pub fn recipes(&self) -> &dyn RecipeStore {
        self.inner.recipes.as_ref()
    }

    /// The recipe search gateway.
    #[must_use]
    pub fn search(&self) -> &RecipeSearch {
        &self.inner.search
    }

    /// The database pool, when running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
