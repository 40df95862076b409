//! Integration tests for the `PostgreSQL` repositories.
//!
//! These tests require a running `PostgreSQL` database:
//!
//! ```bash
//! RECIPE_BOX_TEST_DATABASE_URL=postgres://localhost/recipe_box_test \
//!     cargo test -p recipe-box-integration-tests --test postgres -- --include-ignored
//! ```
//!
//! Every test works on its own uniquely named rows, so they can share one
//! database and run in parallel.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use sqlx::PgPool;

use recipe_box_core::Email;
use recipe_box_web::db::{
    MIGRATOR, RecipeRepository, RecipeStore, StoreError, UserRepository, UserStore,
};
use recipe_box_web::models::{NewUser, ProviderToken, RecipeCandidate};

async fn pool() -> PgPool {
    let url = std::env::var("RECIPE_BOX_TEST_DATABASE_URL")
        .expect("RECIPE_BOX_TEST_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_nanos_opt().unwrap())
}

fn token(access: &str) -> ProviderToken {
    serde_json::from_value(serde_json::json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": 3599,
        "refresh_token_expires_in": 604_799
    }))
    .unwrap()
}

fn new_user(email: &Email, name: &str, access: &str) -> NewUser {
    NewUser {
        email: email.clone(),
        name: Some(name.to_string()),
        avatar: Some(format!("https://avatars.example/{name}.png")),
        tokens: token(access),
    }
}

fn candidate(name: &str) -> RecipeCandidate {
    RecipeCandidate {
        name: name.to_string(),
        url: format!("https://recipes.example/{name}"),
        image_url: format!("https://img.example/{name}.jpg"),
    }
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_upsert_creates_then_updates_one_row() {
    let pool = pool().await;
    let users = UserRepository::new(pool);
    let email = Email::parse(&format!("{}@example.com", unique("upsert"))).unwrap();

    let created = users.upsert(&new_user(&email, "Alice", "at-1")).await.unwrap();
    let updated = users
        .upsert(&new_user(&email, "Alice Liddell", "at-2"))
        .await
        .unwrap();

    assert_eq!(created.id, updated.id);
    assert_eq!(updated.name.as_deref(), Some("Alice Liddell"));
    assert_eq!(updated.tokens.access_token, "at-2");
    assert_eq!(
        updated.tokens.extra.get("refresh_token_expires_in"),
        Some(&serde_json::json!(604_799))
    );
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    let loaded = users.get_by_email(&email).await.unwrap().unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.tokens.access_token, "at-2");

    let all = users.list_all().await.unwrap();
    assert_eq!(all.iter().filter(|u| u.email == email).count(), 1);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_get_missing_user_is_none() {
    let pool = pool().await;
    let users = UserRepository::new(pool);
    let email = Email::parse(&format!("{}@example.com", unique("missing"))).unwrap();

    assert!(users.get_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_recipe_names_are_globally_unique() {
    let pool = pool().await;
    let users = UserRepository::new(pool.clone());
    let recipes = RecipeRepository::new(pool);
    let alice = users
        .upsert(&new_user(
            &Email::parse(&format!("{}@example.com", unique("alice"))).unwrap(),
            "Alice",
            "at-a",
        ))
        .await
        .unwrap();
    let bob = users
        .upsert(&new_user(
            &Email::parse(&format!("{}@example.com", unique("bob"))).unwrap(),
            "Bob",
            "at-b",
        ))
        .await
        .unwrap();
    let name = unique("Chicken Vesuvio");

    let saved = recipes.save(alice.id, &candidate(&name)).await.unwrap();
    assert_eq!(saved.owner, alice.id);
    assert_eq!(saved.name, name);

    let again = recipes.save(alice.id, &candidate(&name)).await;
    assert!(matches!(again, Err(StoreError::DuplicateName(ref n)) if *n == name));

    let other = recipes.save(bob.id, &candidate(&name)).await;
    assert!(matches!(other, Err(StoreError::DuplicateName(_))));

    assert_eq!(recipes.list_for_user(alice.id).await.unwrap().len(), 1);
    assert!(recipes.list_for_user(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_remove_only_touches_own_recipes() {
    let pool = pool().await;
    let users = UserRepository::new(pool.clone());
    let recipes = RecipeRepository::new(pool);
    let alice = users
        .upsert(&new_user(
            &Email::parse(&format!("{}@example.com", unique("alice"))).unwrap(),
            "Alice",
            "at-a",
        ))
        .await
        .unwrap();
    let bob = users
        .upsert(&new_user(
            &Email::parse(&format!("{}@example.com", unique("bob"))).unwrap(),
            "Bob",
            "at-b",
        ))
        .await
        .unwrap();
    let first = unique("Mapo Tofu");
    let second = unique("Tofu Scramble");
    recipes.save(alice.id, &candidate(&first)).await.unwrap();
    recipes.save(alice.id, &candidate(&second)).await.unwrap();

    let denied = recipes.remove(bob.id, &first).await;
    assert!(matches!(denied, Err(StoreError::NotFound)));
    assert_eq!(recipes.list_for_user(alice.id).await.unwrap().len(), 2);

    recipes.remove(alice.id, &first).await.unwrap();
    let left = recipes.list_for_user(alice.id).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].name, second);

    let missing = recipes.remove(alice.id, &first).await;
    assert!(matches!(missing, Err(StoreError::NotFound)));
}
