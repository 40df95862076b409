//! Session login state and access control.
//!
//! A browser session moves through three states:
//!
//! - **Anonymous** - no `user_id` in the session
//! - **Pending callback** - `oauth_state` stored by [`AuthManager::begin_login`]
//! - **Authenticated** - `user_id` stored by [`AuthManager::complete_login`]
//!
//! [`AuthManager::logout`] returns the session to anonymous. Protected
//! handlers call [`AuthManager::require_authenticated`] (usually through the
//! `RequireAuth` extractor), which reloads the user from the store on every
//! request.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use serde::Deserialize;
use subtle::ConstantTimeEq;
use tower_sessions::Session;

use recipe_box_core::UserId;

use crate::db::UserStore;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::session::keys;
use crate::models::token::ProviderToken;
use crate::models::user::{NewUser, Profile, User};
use crate::services::oauth::{AuthorizationRequest, GoogleClient};

/// Error code Google sends when the user declines consent.
const ACCESS_DENIED: &str = "access_denied";

/// Query parameters Google appends to the callback URL.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// What the callback handler should do next.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// The session is now bound to this user.
    LoggedIn(User),
    /// The callback carried neither code nor state; start over.
    RestartLogin,
}

/// Coordinates the OAuth client, the identity store and the session.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserStore>,
    google: GoogleClient,
}

impl AuthManager {
    /// Create a new auth manager.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, google: GoogleClient) -> Self {
        Self { users, google }
    }

    /// Start a login: build the consent URL and remember its state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the state cannot be stored, or
    /// `AuthError::Provider` if the authorization endpoint is misconfigured.
    pub async fn begin_login(&self, session: &Session) -> Result<AuthorizationRequest, AuthError> {
        let request = self.google.build_authorization_request()?;
        session.insert(keys::OAUTH_STATE, &request.state).await?;
        Ok(request)
    }

    /// Read and discard the pending state. A state is usable exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn take_state(&self, session: &Session) -> Result<Option<String>, AuthError> {
        Ok(session.remove::<String>(keys::OAUTH_STATE).await?)
    }

    /// Consume the pending state and compare it with the one returned by the provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StateMismatch` if either side is missing or they differ.
    pub async fn verify_state(
        &self,
        session: &Session,
        returned: Option<&str>,
    ) -> Result<(), AuthError> {
        let stored = self.take_state(session).await?;
        check_state(stored.as_deref(), returned)
    }

    /// Load the user bound to this session.
    ///
    /// A session whose user no longer exists is unbound and treated as
    /// logged out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotLoggedIn` for anonymous sessions, or
    /// `AuthError::Repository`/`AuthError::Session` on storage failures.
    pub async fn require_authenticated(&self, session: &Session) -> Result<User, AuthError> {
        let Some(user_id) = session.get::<UserId>(keys::USER_ID).await? else {
            return Err(AuthError::NotLoggedIn);
        };

        if let Some(user) = self.users.get_by_id(user_id).await? {
            return Ok(user);
        }

        tracing::warn!(%user_id, "Session refers to a missing user; unbinding");
        session.remove_value(keys::USER_ID).await?;
        Err(AuthError::NotLoggedIn)
    }

    /// Like [`Self::require_authenticated`], but anonymous is not an error.
    ///
    /// # Errors
    ///
    /// Returns storage errors only.
    pub async fn current_user(&self, session: &Session) -> Result<Option<User>, AuthError> {
        match self.require_authenticated(session).await {
            Ok(user) => Ok(Some(user)),
            Err(AuthError::NotLoggedIn) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create or refresh the user for this profile and bind the session to it.
    ///
    /// The session ID is rotated before the user ID is written.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the upsert fails, or
    /// `AuthError::Session` if the session cannot be updated.
    pub async fn complete_login(
        &self,
        session: &Session,
        profile: Profile,
        token: ProviderToken,
    ) -> Result<User, AuthError> {
        let user = self
            .users
            .upsert(&NewUser::from_login(profile, token))
            .await?;

        session.cycle_id().await?;
        session.insert(keys::USER_ID, user.id).await?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(user)
    }

    /// Unbind the session from its user and forget its last search.
    ///
    /// The provider token is left as is.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be updated.
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(user_id) = session.remove::<UserId>(keys::USER_ID).await? {
            tracing::info!(%user_id, "User logged out");
        }
        session.remove_value(keys::LAST_SEARCH).await?;
        clear_sentry_user();
        Ok(())
    }

    /// Run the whole callback leg of the flow.
    ///
    /// The stored state is discarded first, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - `AuthError::AccessDenied` / `AuthError::Provider` when Google reports an error
    /// - `AuthError::StateMismatch` when the state does not match
    /// - `AuthError::ProviderRejected` when the code cannot be exchanged
    /// - `AuthError::ProfileUnavailable` when the profile cannot be read
    pub async fn handle_callback(
        &self,
        session: &Session,
        params: CallbackParams,
    ) -> Result<CallbackOutcome, AuthError> {
        let stored = self.take_state(session).await?;

        if let Some(error) = params.error {
            return Err(if error == ACCESS_DENIED {
                AuthError::AccessDenied
            } else {
                AuthError::Provider(error)
            });
        }

        if params.code.is_none() && params.state.is_none() {
            return Ok(CallbackOutcome::RestartLogin);
        }

        check_state(stored.as_deref(), params.state.as_deref())?;

        let code = params.code.ok_or_else(|| {
            AuthError::ProviderRejected("callback carried no authorization code".to_string())
        })?;

        let token = self
            .google
            .exchange_code(&code, self.google.redirect_uri())
            .await?;
        let profile = self.google.fetch_profile(&token).await?;
        let user = self.complete_login(session, profile, token).await?;

        Ok(CallbackOutcome::LoggedIn(user))
    }
}

/// Constant-time comparison of the stored and returned state.
fn check_state(stored: Option<&str>, returned: Option<&str>) -> Result<(), AuthError> {
    match (stored, returned) {
        (Some(stored), Some(returned))
            if bool::from(stored.as_bytes().ct_eq(returned.as_bytes())) =>
        {
            Ok(())
        }
        _ => Err(AuthError::StateMismatch),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_state_accepts_exact_match() {
        assert!(check_state(Some("abc123"), Some("abc123")).is_ok());
    }

    #[test]
    fn test_check_state_rejects_mismatch_and_absence() {
        for (stored, returned) in [
            (Some("abc123"), Some("abc124")),
            (Some("abc123"), Some("abc1234")),
            (Some("abc123"), None),
            (None, Some("abc123")),
            (None, None),
        ] {
            assert!(
                matches!(check_state(stored, returned), Err(AuthError::StateMismatch)),
                "{stored:?} vs {returned:?}"
            );
        }
    }
}
