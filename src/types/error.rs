//! Error types for Hearth
//!
//! Every failure a handler can hit is one of these variants, and
//! [`HearthError::into_status_code_and_body`] is the single place they turn
//! into HTTP responses.

use hyper::StatusCode;
use serde_json::json;

/// Main error type for Hearth operations
#[derive(Debug, thiserror::Error)]
pub enum HearthError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HearthError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller gets to see the underlying message
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message shown to the caller. Server-side failures are reduced to a
    /// generic text; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }

    /// Convert to status code and JSON body for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        let status = self.status_code();
        let body = json!({ "error": self.public_message() }).to_string();
        (status, body)
    }
}

impl From<std::io::Error> for HearthError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<hyper::Error> for HearthError {
    fn from(err: hyper::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<mongodb::error::Error> for HearthError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for HearthError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("Failed to encode document: {}", err))
    }
}

impl From<bson::de::Error> for HearthError {
    fn from(err: bson::de::Error) -> Self {
        Self::Database(format!("Failed to decode document: {}", err))
    }
}

/// Result type alias for Hearth operations
pub type Result<T> = std::result::Result<T, HearthError>;
