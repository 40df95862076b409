//! Session-related types.
//!
//! The session is the only place per-browser state lives: the pending OAuth
//! state token, the logged-in user's ID, the last search, and flash messages.

use serde::{Deserialize, Serialize};

/// Session keys.
pub mod keys {
    /// Anti-forgery state for the login in progress. Written on `/login`,
    /// read and discarded on `/gCallback`.
    pub const OAUTH_STATE: &str = "oauth_state";

    /// ID of the logged-in user. Written on successful login, removed on logout.
    pub const USER_ID: &str = "user_id";

    /// This session's most recent recipe search.
    pub const LAST_SEARCH: &str = "last_search";

    /// One-shot messages shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

/// A one-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Visual category of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS class used by the templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}
