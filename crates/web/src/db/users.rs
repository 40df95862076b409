//! User repository for database operations.
//!
//! Users are keyed by email. Every successful login goes through
//! [`UserStore::upsert`], which creates the row on first login and refreshes
//! name, avatar and tokens afterwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use recipe_box_core::{Email, UserId};

use super::{RepositoryError, UserStore};
use crate::models::token::ProviderToken;
use crate::models::user::{NewUser, User};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `users` queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: Option<String>,
    avatar: Option<String>,
    tokens: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let tokens: ProviderToken = serde_json::from_value(row.tokens).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid token data for user {}: {e}", row.id))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            avatar: row.avatar,
            tokens,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, avatar, tokens, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL`-backed [`UserStore`].
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn upsert(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (email, name, avatar, tokens)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
               SET name = EXCLUDED.name,
                   avatar = EXCLUDED.avatar,
                   tokens = EXCLUDED.tokens,
                   updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.email.as_str())
        .bind(user.name.as_deref())
        .bind(user.avatar.as_deref())
        .bind(Json(&user.tokens))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
