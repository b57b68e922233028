//! HTTP routes for Hearth

pub mod challenges;
pub mod checkins;
pub mod events;
pub mod friendship;
pub mod groups;
pub mod health;
pub mod notifications;
pub mod progress;
pub mod response;
pub mod status;

pub use health::health_check;
pub use response::{
    error_response, json_response, not_found_response, preflight_response, read_body,
    text_response, HttpResponse,
};
pub use status::status_check;
