//! Domain models for Recipe Box.
//!
//! - [`user`] - Persisted users and the upsert input built from a provider profile
//! - [`token`] - The structured OAuth credential stored with each user
//! - [`recipe`] - Saved recipes, transient search candidates, and the per-session last search
//! - [`session`] - Keys and values stored in the browser session

pub mod recipe;
pub mod session;
pub mod token;
pub mod user;

pub use recipe::{LastSearch, Recipe, RecipeCandidate};
pub use session::{Flash, keys as session_keys};
pub use token::ProviderToken;
pub use user::{NewUser, Profile, User};
