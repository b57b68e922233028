//! HTTP server for Hearth

pub mod http;

pub use http::{handle_request, run, AppState};
