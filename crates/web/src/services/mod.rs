//! Business logic services.
//!
//! # Services
//!
//! - [`oauth`] - Google authorization-code flow: authorization URL, code exchange, profile fetch
//! - [`auth`] - Session login state: state tokens, login completion, access control
//! - [`search`] - Edamam recipe search

pub mod auth;
pub mod oauth;
pub mod search;
