//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during the login flow and on protected requests.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The callback `state` did not match the one stored in the session,
    /// or the session had none.
    #[error("invalid state parameter")]
    StateMismatch,

    /// The token endpoint refused the authorization code or returned garbage.
    #[error("token exchange failed: {0}")]
    ProviderRejected(String),

    /// The userinfo endpoint could not be read.
    #[error("could not fetch profile: {0}")]
    ProfileUnavailable(String),

    /// The session is not bound to a user.
    #[error("not logged in")]
    NotLoggedIn,

    /// The user declined consent on the provider's page.
    #[error("access denied by user")]
    AccessDenied,

    /// The provider redirected back with an error other than `access_denied`.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider reported an email we cannot use as a key.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] recipe_box_core::EmailError),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<tower_sessions::session::Error> for AuthError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}
