//! Recipe repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use recipe_box_core::{RecipeId, UserId};

use super::{RecipeStore, RepositoryError, StoreError, map_unique_violation};
use crate::models::recipe::{Recipe, RecipeCandidate};

/// Internal row type for `recipes` queries.
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: i32,
    user_id: i32,
    name: String,
    url: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: RecipeId::new(row.id),
            owner: UserId::new(row.user_id),
            name: row.name,
            url: row.url,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL`-backed [`RecipeStore`].
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for RecipeRepository {
    async fn save(
        &self,
        owner: UserId,
        candidate: &RecipeCandidate,
    ) -> Result<Recipe, StoreError> {
        let row: RecipeRow = sqlx::query_as(
            r"
            INSERT INTO recipes (user_id, name, url, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, url, image_url, created_at
            ",
        )
        .bind(owner)
        .bind(&candidate.name)
        .bind(&candidate.url)
        .bind(&candidate.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_unique_violation(e, "recipe") {
            RepositoryError::Conflict(_) => StoreError::DuplicateName(candidate.name.clone()),
            other => StoreError::Repository(other),
        })?;

        Ok(row.into())
    }

    async fn list_for_user(&self, owner: UserId) -> Result<Vec<Recipe>, StoreError> {
        let rows: Vec<RecipeRow> = sqlx::query_as(
            r"
            SELECT id, user_id, name, url, image_url, created_at
            FROM recipes
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn remove(&self, owner: UserId, name: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE user_id = $1 AND name = $2")
            .bind(owner)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
