//! Shared types for the session console workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
