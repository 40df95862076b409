//! Recipe Box configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RECIPE_BOX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `RECIPE_BOX_BASE_URL` - Public URL of the app; the OAuth redirect URI is `{base}/gCallback`
//! - `RECIPE_BOX_SESSION_SECRET` - Session cookie signing secret (min 32 chars, high entropy)
//! - `GOOGLE_CLIENT_ID` - Google OAuth client ID
//! - `GOOGLE_CLIENT_SECRET` - Google OAuth client secret
//! - `EDAMAM_APP_ID` - Edamam recipe search application ID
//! - `EDAMAM_APP_KEY` - Edamam recipe search application key
//!
//! ## Optional
//! - `RECIPE_BOX_HOST` - Bind address (default: 127.0.0.1)
//! - `RECIPE_BOX_PORT` - Listen port (default: 5000)
//! - `GOOGLE_AUTH_URL` / `GOOGLE_TOKEN_URL` / `GOOGLE_USERINFO_URL` - Provider endpoints
//! - `EDAMAM_BASE_URL` - Recipe API base URL (default: <https://api.edamam.com>)
//! - `HTTP_TIMEOUT_SECS` - Timeout for outbound calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/userinfo/v2/me";
pub const DEFAULT_EDAMAM_BASE_URL: &str = "https://api.edamam.com";

/// Path of the OAuth redirect target, relative to the base URL.
pub const CALLBACK_PATH: &str = "/gCallback";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
    "hardtoguess",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Recipe Box application configuration.
#[derive(Debug, Clone)]
pub struct RecipeBoxConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Google OAuth client configuration
    pub google: GoogleOAuthConfig,
    /// Edamam recipe search configuration
    pub edamam: EdamamConfig,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Google OAuth 2.0 client configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

/// Edamam recipe search API configuration.
///
/// Implements `Debug` manually to redact the application key.
#[derive(Clone)]
pub struct EdamamConfig {
    pub app_id: String,
    pub app_key: SecretString,
    pub base_url: String,
}

impl std::fmt::Debug for EdamamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdamamConfig")
            .field("app_id", &self.app_id)
            .field("app_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl RecipeBoxConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("RECIPE_BOX_DATABASE_URL")?;
        let host = get_env_or_default("RECIPE_BOX_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("RECIPE_BOX_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("RECIPE_BOX_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("RECIPE_BOX_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("RECIPE_BOX_BASE_URL")?;
        let base_url = normalize_base_url("RECIPE_BOX_BASE_URL", &base_url)?;
        let session_secret = get_validated_secret("RECIPE_BOX_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "RECIPE_BOX_SESSION_SECRET")?;

        let timeout_secs = get_env_or_default("HTTP_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            google: GoogleOAuthConfig::from_env()?,
            edamam: EdamamConfig::from_env()?,
            http_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The OAuth redirect URI registered with the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}{CALLBACK_PATH}", self.base_url)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl GoogleOAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("GOOGLE_CLIENT_ID")?,
            client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
            auth_url: get_env_or_default("GOOGLE_AUTH_URL", DEFAULT_GOOGLE_AUTH_URL),
            token_url: get_env_or_default("GOOGLE_TOKEN_URL", DEFAULT_GOOGLE_TOKEN_URL),
            userinfo_url: get_env_or_default("GOOGLE_USERINFO_URL", DEFAULT_GOOGLE_USERINFO_URL),
        })
    }
}

impl EdamamConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("EDAMAM_BASE_URL", DEFAULT_EDAMAM_BASE_URL);
        Ok(Self {
            app_id: get_required_env("EDAMAM_APP_ID")?,
            app_key: get_validated_secret("EDAMAM_APP_KEY")?,
            base_url: normalize_base_url("EDAMAM_BASE_URL", &base_url)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to the generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Check that a URL parses with an http(s) scheme and strip any trailing slash.
fn normalize_base_url(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A complete configuration pointing at the real provider endpoints.
    pub(crate) fn test_config() -> RecipeBoxConfig {
        sample_config("http://localhost:5000")
    }

    fn sample_config(base_url: &str) -> RecipeBoxConfig {
        RecipeBoxConfig {
            database_url: SecretString::from("postgres://localhost/recipebox"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from("k".repeat(32)),
            google: GoogleOAuthConfig {
                client_id: "client-id-value".to_string(),
                client_secret: SecretString::from("super_secret_client_secret"),
                auth_url: DEFAULT_GOOGLE_AUTH_URL.to_string(),
                token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
                userinfo_url: DEFAULT_GOOGLE_USERINFO_URL.to_string(),
            },
            edamam: EdamamConfig {
                app_id: "app-id-value".to_string(),
                app_key: SecretString::from("super_secret_app_key"),
                base_url: DEFAULT_EDAMAM_BASE_URL.to_string(),
            },
            http_timeout: Duration::from_secs(10),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_rejects_original_default_key() {
        let result = validate_secret_strength("hardtoguessstring", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        let url = normalize_base_url("X", "http://localhost:5000/").unwrap();
        assert_eq!(url, "http://localhost:5000");
    }

    #[test]
    fn test_normalize_base_url_rejects_other_schemes() {
        assert!(normalize_base_url("X", "ftp://localhost").is_err());
        assert!(normalize_base_url("X", "not a url").is_err());
    }

    #[test]
    fn test_redirect_uri_and_secure_flag() {
        let local = sample_config("http://localhost:5000");
        assert_eq!(local.redirect_uri(), "http://localhost:5000/gCallback");
        assert!(!local.is_secure());

        let prod = sample_config("https://recipes.example.org");
        assert!(prod.is_secure());
    }

    #[test]
    fn test_socket_addr() {
        let addr = sample_config("http://localhost:5000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = sample_config("http://localhost:5000");
        let debug_output = format!("{:?}{:?}", config.google, config.edamam);

        assert!(debug_output.contains("client-id-value"));
        assert!(debug_output.contains("app-id-value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
        assert!(!debug_output.contains("super_secret_app_key"));
    }
}
