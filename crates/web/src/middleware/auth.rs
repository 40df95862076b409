//! Authentication extractors.
//!
//! The session only carries the user's ID; both extractors reload the
//! [`User`] through the auth manager on every request.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::user::User;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Anonymous requests are redirected to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_recipes(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub User);

/// Why [`RequireAuth`] refused a request.
pub enum AuthRejection {
    /// No user is bound to the session.
    RedirectToLogin,
    /// The session or user store failed.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotLoggedIn => Self::RedirectToLogin,
            other => Self::Failed(other.into()),
        }
    }
}

fn session_from_parts(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts).map_err(AuthRejection::Failed)?;
        let user = state.auth().require_authenticated(&session).await?;
        Ok(Self(user))
    }
}

/// Extractor that loads the current user if there is one.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        let user = state.auth().current_user(&session).await?;
        Ok(Self(user))
    }
}
