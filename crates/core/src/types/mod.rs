//! Type-safe wrappers for Recipe Box domain concepts.

pub mod email;
pub mod id;

pub use email::{Email, EmailError};
pub use id::*;
