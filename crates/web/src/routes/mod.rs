//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Ingredient search form (login required)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth
//! GET  /login                  - Login page with the Google consent link
//! GET  /gCallback              - OAuth callback from Google
//! GET  /logout                 - Log out (login required)
//!
//! # Recipes
//! GET  /recipes                - This session's last search, or a new one with ?ingredient=
//! POST /recipes                - Run a search (form field `ingredient`)
//! POST /save/{recipe_name}     - Save a result from the last search (login required)
//! GET  /seeMyRecipes           - The user's recipe box (login required)
//! GET  /remove/{recipe_name}   - Remove a saved recipe (login required)
//! ```
//!
//! Anything else renders the 404 page.

pub mod auth;
pub mod health;
pub mod recipes;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::config::CALLBACK_PATH;
use crate::error::AppError;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route(CALLBACK_PATH, get(auth::callback))
        .route("/logout", get(auth::logout))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::index))
        .route("/recipes", get(recipes::results).post(recipes::search))
        .route("/save/{recipe_name}", post(recipes::save))
        .route("/seeMyRecipes", get(recipes::my_recipes))
        .route("/remove/{recipe_name}", get(recipes::remove))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .merge(recipe_routes())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
