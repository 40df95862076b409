//! Google OAuth2 authorization-code client.
//!
//! # Flow
//!
//! 1. [`GoogleClient::build_authorization_request`] produces the consent URL
//!    and a fresh anti-forgery state. The caller stores the state in the
//!    session and sends the browser to the URL.
//! 2. Google redirects back to `/gCallback` with `code` and `state`.
//! 3. [`GoogleClient::exchange_code`] trades the code for a [`ProviderToken`].
//! 4. [`GoogleClient::fetch_profile`] reads email, name and picture with that token.

use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use recipe_box_core::Email;

use crate::config::RecipeBoxConfig;
use crate::models::token::ProviderToken;
use crate::models::user::Profile;
use crate::services::auth::AuthError;

/// Scopes requested from Google.
pub const SCOPES: &str = "profile email";

/// Length of the anti-forgery state token.
pub const STATE_LENGTH: usize = 32;

/// Where to send the browser, and the state that must come back with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Client for Google's OAuth2 and userinfo endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    redirect_uri: String,
}

/// Body of Google's `userinfo/v2/me` response. Only the fields we keep.
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleClient {
    /// Create a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &RecipeBoxConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GoogleClientInner {
                client,
                client_id: config.google.client_id.clone(),
                client_secret: config.google.client_secret.clone(),
                auth_url: config.google.auth_url.clone(),
                token_url: config.google.token_url.clone(),
                userinfo_url: config.google.userinfo_url.clone(),
                redirect_uri: config.redirect_uri(),
            }),
        })
    }

    /// The callback URL registered with Google.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.inner.redirect_uri
    }

    /// Build the consent URL together with a new random state.
    ///
    /// Requests offline access so the token response carries a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the configured authorization endpoint
    /// is not a valid URL.
    pub fn build_authorization_request(&self) -> Result<AuthorizationRequest, AuthError> {
        let state = generate_state();
        let url = Url::parse_with_params(
            &self.inner.auth_url,
            &[
                ("client_id", self.inner.client_id.as_str()),
                ("redirect_uri", self.inner.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "offline"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AuthError::Provider(format!("invalid authorization endpoint: {e}")))?;

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
        })
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderRejected` if the request fails, the
    /// endpoint answers with a non-2xx status, or the body is not a token response.
    #[tracing::instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ProviderToken, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
        ];

        let response = self
            .inner
            .client
            .post(&self.inner.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::ProviderRejected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %text, "Token exchange rejected");
            return Err(AuthError::ProviderRejected(format!("status {status}")));
        }

        response
            .json::<ProviderToken>()
            .await
            .map_err(|e| AuthError::ProviderRejected(format!("malformed token response: {e}")))
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProfileUnavailable` on any non-200 response or an
    /// unusable body, and `AuthError::InvalidEmail` if the reported email is
    /// structurally invalid.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_profile(&self, token: &ProviderToken) -> Result<Profile, AuthError> {
        let response = self
            .inner
            .client
            .get(&self.inner.userinfo_url)
            .header(reqwest::header::AUTHORIZATION, token.authorization_header())
            .send()
            .await
            .map_err(|e| AuthError::ProfileUnavailable(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AuthError::ProfileUnavailable(format!("status {status}")));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::ProfileUnavailable(format!("malformed profile: {e}")))?;

        let email = info
            .email
            .ok_or_else(|| AuthError::ProfileUnavailable("profile has no email".to_string()))?;

        Ok(Profile {
            email: Email::parse(&email)?,
            name: info.name.filter(|n| !n.trim().is_empty()),
            avatar_url: info.picture.filter(|p| !p.trim().is_empty()),
        })
    }
}

/// Generate a random alphanumeric anti-forgery token.
fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::config::tests::test_config;

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_authorization_url_carries_required_params() {
        let client = GoogleClient::new(&test_config()).unwrap();
        let request = client.build_authorization_request().unwrap();

        assert!(request.url.starts_with(crate::config::DEFAULT_GOOGLE_AUTH_URL));
        let query = query_of(&request.url);
        assert_eq!(query["client_id"], "client-id-value");
        assert_eq!(query["redirect_uri"], "http://localhost:5000/gCallback");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "profile email");
        assert_eq!(query["access_type"], "offline");
        assert_eq!(query["state"], request.state);
    }

    #[test]
    fn test_state_is_fresh_per_request() {
        let client = GoogleClient::new(&test_config()).unwrap();
        let first = client.build_authorization_request().unwrap();
        let second = client.build_authorization_request().unwrap();

        assert_eq!(first.state.len(), STATE_LENGTH);
        assert!(first.state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first.state, second.state);
    }

    #[test]
    fn test_bad_authorization_endpoint_is_an_error() {
        let mut config = test_config();
        config.google.auth_url = "not a url".to_string();
        let client = GoogleClient::new(&config).unwrap();

        assert!(matches!(
            client.build_authorization_request(),
            Err(AuthError::Provider(_))
        ));
    }
}
