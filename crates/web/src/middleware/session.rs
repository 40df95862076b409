//! Session middleware configuration.
//!
//! Cookies are signed with a key derived from `RECIPE_BOX_SESSION_SECRET`.
//! Production uses the `PostgreSQL` store; tests pass a `MemoryStore`.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::RecipeBoxConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "rb_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over any session store.
#[must_use]
pub fn create_session_layer<S>(
    store: S,
    config: &RecipeBoxConfig,
) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}

/// Stretch the configured secret to the 64 bytes a cookie `Key` needs.
fn signing_key(config: &RecipeBoxConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_signing_key_is_deterministic_per_secret() {
        let config = test_config();
        assert_eq!(
            signing_key(&config).master(),
            signing_key(&config).master()
        );

        let mut other = test_config();
        other.session_secret = "z".repeat(40).into();
        assert_ne!(signing_key(&config).master(), signing_key(&other).master());
    }
}
