//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Login and search failures are
//! shown to the user as short plain-text messages; missing resources render
//! the 404 page; everything else renders the generic 500 page and is captured
//! to Sentry with the details kept server-side.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::db::{RepositoryError, StoreError};
use crate::services::auth::AuthError;
use crate::services::search::SearchError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Login flow or access control failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Recipe search failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Recipe box operation failed.
    #[error("Recipe store error: {0}")]
    Store(#[from] StoreError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Generic "page not found" page.
#[derive(Template, WebTemplate)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate;

/// Generic "something went wrong" page.
#[derive(Template, WebTemplate)]
#[template(path = "errors/500.html")]
pub struct ServerErrorTemplate;

impl AppError {
    /// Whether this is a fault on our side rather than a user-facing failure.
    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Store(StoreError::Repository(_))
                | Self::Auth(AuthError::Repository(_) | AuthError::Session(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, ServerErrorTemplate).into_response();
        }

        match self {
            Self::NotFound(what) => {
                tracing::debug!(%what, "Not found");
                (StatusCode::NOT_FOUND, NotFoundTemplate).into_response()
            }
            Self::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, NotFoundTemplate).into_response()
            }
            Self::Store(StoreError::DuplicateName(name)) => (
                StatusCode::CONFLICT,
                format!("A recipe named '{name}' has already been saved."),
            )
                .into_response(),
            Self::Auth(err) => auth_error_response(&err),
            Self::Search(err) => search_error_response(&err),
            // Server faults returned above.
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServerErrorTemplate).into_response(),
        }
    }
}

fn auth_error_response(err: &AuthError) -> Response {
    tracing::warn!(error = %err, "Login failed");

    let (status, message) = match err {
        AuthError::NotLoggedIn => return Redirect::to("/login").into_response(),
        AuthError::AccessDenied => (StatusCode::FORBIDDEN, "You denied access."),
        AuthError::Provider(_) => (StatusCode::BAD_REQUEST, "Error encountered."),
        AuthError::StateMismatch => (StatusCode::BAD_REQUEST, "Invalid state parameter."),
        AuthError::ProviderRejected(_) => (StatusCode::BAD_GATEWAY, "HTTPError occurred."),
        AuthError::ProfileUnavailable(_) | AuthError::InvalidEmail(_) => {
            (StatusCode::BAD_GATEWAY, "Could not fetch your information.")
        }
        AuthError::Session(_) | AuthError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    };

    (status, message).into_response()
}

fn search_error_response(err: &SearchError) -> Response {
    match err {
        SearchError::EmptyQuery => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        SearchError::UpstreamUnavailable(detail) | SearchError::MalformedResponse(detail) => {
            tracing::warn!(%detail, "Recipe search failed");
            (
                StatusCode::BAD_GATEWAY,
                "Recipe search is unavailable right now. Please try again later.",
            )
                .into_response()
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
