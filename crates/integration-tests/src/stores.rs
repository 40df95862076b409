//! In-memory implementations of the store traits.
//!
//! They follow the same rules as the `PostgreSQL` repositories: emails are
//! unique, recipe names are unique across all users, and removal only
//! touches the caller's own rows.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use recipe_box_core::{Email, RecipeId, UserId};
use recipe_box_web::db::{RecipeStore, RepositoryError, StoreError, UserStore};
use recipe_box_web::models::{NewUser, Recipe, RecipeCandidate, User};

/// Users held in memory.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    /// Snapshot of every stored user.
    #[must_use]
    pub fn all(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }

    /// Look up a user by email string.
    #[must_use]
    pub fn find(&self, email: &str) -> Option<User> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn upsert(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = rows.iter_mut().find(|u| u.email == user.email) {
            existing.name.clone_from(&user.name);
            existing.avatar.clone_from(&user.avatar);
            existing.tokens = user.tokens.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let next_id = rows.iter().map(|u| u.id.as_i32()).max().unwrap_or(0) + 1;
        let created = User {
            id: UserId::new(next_id),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            tokens: user.tokens.clone(),
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.all())
    }
}

/// Recipes held in memory.
#[derive(Default)]
pub struct MemoryRecipeStore {
    rows: Mutex<Vec<Recipe>>,
}

impl MemoryRecipeStore {
    /// Snapshot of every stored recipe, across all users.
    #[must_use]
    pub fn all(&self) -> Vec<Recipe> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn save(
        &self,
        owner: UserId,
        candidate: &RecipeCandidate,
    ) -> Result<Recipe, StoreError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.iter().any(|r| r.name == candidate.name) {
            return Err(StoreError::DuplicateName(candidate.name.clone()));
        }

        let next_id = rows.iter().map(|r| r.id.as_i32()).max().unwrap_or(0) + 1;
        let recipe = Recipe {
            id: RecipeId::new(next_id),
            owner,
            name: candidate.name.clone(),
            url: candidate.url.clone(),
            image_url: candidate.image_url.clone(),
            created_at: Utc::now(),
        };
        rows.push(recipe.clone());
        Ok(recipe)
    }

    async fn list_for_user(&self, owner: UserId) -> Result<Vec<Recipe>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }

    async fn remove(&self, owner: UserId, name: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let position = rows
            .iter()
            .position(|r| r.owner == owner && r.name == name)
            .ok_or(StoreError::NotFound)?;
        rows.remove(position);
        Ok(())
    }
}
