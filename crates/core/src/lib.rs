//! Recipe Box Core - Shared types library.
//!
//! This crate provides the types shared by every Recipe Box component:
//! - `web` - The recipe search and recipe box web application
//! - `cli` - Command-line tools for migrations and user inspection
//! - `integration-tests` - In-memory stores and end-to-end tests
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Enable the `postgres` feature to get `sqlx` encoding
//! for the ID newtypes and [`Email`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
