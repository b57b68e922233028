//! Shared types

pub mod error;

pub use error::{HearthError, Result};
