//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use recipe_box_core::{Email, UserId};

use super::token::ProviderToken;

/// A user who has logged in with Google at least once.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email reported by the provider; unique across users.
    pub email: Email,
    /// Display name, if the provider shared one.
    pub name: Option<String>,
    /// Avatar image URL, if the provider shared one.
    pub avatar: Option<String>,
    /// Credential returned by the most recent login.
    pub tokens: ProviderToken,
    /// When the user first logged in.
    pub created_at: DateTime<Utc>,
    /// When the user last logged in.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Profile returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub email: Email,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Input for creating or refreshing a user on login.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub tokens: ProviderToken,
}

impl NewUser {
    /// Combine a fetched profile with the token it was fetched with.
    #[must_use]
    pub fn from_login(profile: Profile, tokens: ProviderToken) -> Self {
        Self {
            email: profile.email,
            name: profile.name,
            avatar: profile.avatar_url,
            tokens,
        }
    }
}
