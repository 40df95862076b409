//! OAuth credential stored with each user.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// The token endpoint's response, kept as a structured record.
///
/// Well-known fields are typed; anything else the provider sends lands in
/// `extra` so the full response survives a round trip through the
/// `users.tokens` JSONB column.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, relative to `obtained_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Set when the token response is first parsed; the provider never sends it.
    #[serde(default = "Utc::now")]
    pub obtained_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl ProviderToken {
    /// When the access token stops being valid, if the provider said.
    ///
    /// Lifetimes that fall outside the representable date range yield `None`.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(self.expires_in?)?;
        self.obtained_at.checked_add_signed(lifetime)
    }

    /// Value for an `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("obtained_at", &self.obtained_at)
            .field("extra_fields", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const GOOGLE_RESPONSE: &str = r#"{
        "access_token": "ya29.a0Af",
        "expires_in": 3599,
        "refresh_token": "1//0g-refresh",
        "scope": "openid https://www.googleapis.com/auth/userinfo.email",
        "token_type": "Bearer",
        "id_token": "eyJhbGciOi",
        "refresh_token_expires_in": 604799
    }"#;

    #[test]
    fn test_parses_provider_response_and_keeps_unknown_fields() {
        let token: ProviderToken = serde_json::from_str(GOOGLE_RESPONSE).unwrap();

        assert_eq!(token.access_token, "ya29.a0Af");
        assert_eq!(token.refresh_token.as_deref(), Some("1//0g-refresh"));
        assert_eq!(token.expires_in, Some(3599));
        assert_eq!(
            token.extra.get("refresh_token_expires_in"),
            Some(&serde_json::json!(604_799))
        );
    }

    #[test]
    fn test_stored_form_preserves_obtained_at_and_extras() {
        let token: ProviderToken = serde_json::from_str(GOOGLE_RESPONSE).unwrap();
        let stored = serde_json::to_value(&token).unwrap();
        let reloaded: ProviderToken = serde_json::from_value(stored).unwrap();

        assert_eq!(reloaded, token);
    }

    #[test]
    fn test_minimal_response_defaults() {
        let token: ProviderToken = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert!(token.refresh_token.is_none());
        assert!(token.expires_at().is_none());
        assert_eq!(token.authorization_header(), "Bearer abc");
    }

    #[test]
    fn test_expires_at_is_relative_to_obtained_at() {
        let mut token: ProviderToken =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":60}"#).unwrap();
        token.obtained_at = DateTime::from_timestamp(1_000, 0).unwrap();

        assert_eq!(token.expires_at(), DateTime::from_timestamp(1_060, 0));
    }

    #[test]
    fn test_expires_at_out_of_range_is_none() {
        for secs in [i64::MAX, i64::MIN, 100_000_000_000_000] {
            let token: ProviderToken = serde_json::from_value(serde_json::json!({
                "access_token": "abc",
                "expires_in": secs
            }))
            .unwrap();

            assert_eq!(token.expires_at(), None, "expires_in = {secs}");
        }
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let token: ProviderToken = serde_json::from_str(GOOGLE_RESPONSE).unwrap();
        let debug = format!("{token:?}");

        assert!(!debug.contains("ya29.a0Af"));
        assert!(!debug.contains("1//0g-refresh"));
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(debug.contains("refresh_token_expires_in"));
    }
}
