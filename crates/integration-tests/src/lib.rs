//! Integration test support for Recipe Box.
//!
//! Spins up the real router on an ephemeral port, backed by in-memory stores
//! and a session `MemoryStore`, with fake Google and Edamam servers standing
//! in for the external APIs.
//!
//! # Running Tests
//!
//! ```bash
//! # Everything that needs no database
//! cargo test -p recipe-box-integration-tests
//!
//! # Including the PostgreSQL repository tests
//! RECIPE_BOX_TEST_DATABASE_URL=postgres://localhost/recipe_box_test \
//!     cargo test -p recipe-box-integration-tests -- --include-ignored
//! ```
//!
//! # Modules
//!
//! - [`stores`] - `UserStore` / `RecipeStore` over `Mutex<Vec<_>>`
//! - [`fakes`] - Fake OAuth provider and recipe API
//! - [`harness`] - [`TestApp`]: the app plus its fakes, and a login helper

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

pub mod fakes;
pub mod harness;
pub mod stores;

pub use fakes::{FakeAccount, FakeEdamam, FakeGoogle, FixtureHit};
pub use harness::{TestApp, html_unescape};
pub use stores::{MemoryRecipeStore, MemoryUserStore};
