//! Hearth - social events, check-ins, goals and groups
//!
//! A JSON-over-HTTP service for a social app: calendar events with
//! visibility rules, check-ins that earn social points, achievements and
//! goals, friendships, groups, notifications and shared challenges. All
//! state lives in a document store (MongoDB, or in memory in dev mode).

pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{handle_request, run, AppState};
pub use types::{HearthError, Result};
