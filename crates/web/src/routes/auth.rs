//! Login, OAuth callback, and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::auth::{CallbackOutcome, CallbackParams};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub auth_url: String,
}

/// Show the login page.
///
/// Already logged-in users go straight to the search form. Otherwise a new
/// anti-forgery state is stored and the page links to Google's consent screen.
///
/// # Route
///
/// `GET /login`
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let request = state.auth().begin_login(&session).await?;

    Ok(LoginTemplate {
        auth_url: request.url,
    }
    .into_response())
}

/// Handle Google's redirect back to us.
///
/// # Route
///
/// `GET /gCallback?code=...&state=...` (or `?error=...`)
#[tracing::instrument(skip_all, fields(has_code = params.code.is_some(), error = ?params.error))]
pub async fn callback(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    if user.is_some() {
        return Ok(Redirect::to("/"));
    }

    match state.auth().handle_callback(&session, params).await? {
        CallbackOutcome::LoggedIn(_) => Ok(Redirect::to("/")),
        CallbackOutcome::RestartLogin => Ok(Redirect::to("/login")),
    }
}

/// Log out and return to the (protected) home page, which bounces to `/login`.
///
/// # Route
///
/// `GET /logout`
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Redirect> {
    state.auth().logout(&session).await?;
    Ok(Redirect::to("/"))
}
