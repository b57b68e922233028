//! Response builders and body parsing shared by the route handlers
//!
//! Every JSON response carries the CORS headers, so browser clients can call
//! the service from any origin.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::types::{HearthError, Result};

/// Response type produced by every handler
pub type HttpResponse = Response<Full<Bytes>>;

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, OPTIONS";

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

fn build(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    with_cors(response)
}

/// Serialize `body` as the JSON payload of a response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(json) => build(status, "application/json", json),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                "application/json",
                json!({ "error": "Internal Server Error" }).to_string(),
            )
        }
    }
}

pub fn text_response(status: StatusCode, body: &'static str) -> HttpResponse {
    build(status, "text/plain; charset=utf-8", body)
}

/// Map an error to its response. Server-side details are logged, never sent.
pub fn error_response(err: HearthError) -> HttpResponse {
    if !err.is_client_error() {
        error!("Request failed: {}", err);
    }
    let (status, body) = err.into_status_code_and_body();
    build(status, "application/json", body)
}

/// CORS preflight response
pub fn preflight_response() -> HttpResponse {
    let mut response = with_cors(Response::new(Full::new(Bytes::new())));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    response
}

/// Not found response
pub fn not_found_response(path: &str) -> HttpResponse {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({ "error": "Not Found", "path": path }),
    )
}

/// Read a request body, refusing anything larger than `limit` bytes
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(
            HearthError::BadRequest(format!("Request body exceeds {} bytes", limit)),
        ),
        Err(e) => Err(HearthError::Http(format!("Failed to read body: {}", e))),
    }
}

/// Parse a JSON request body
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.is_empty() {
        return Err(HearthError::BadRequest("Request body is required".into()));
    }
    serde_json::from_slice(body).map_err(|e| HearthError::BadRequest(format!("Invalid JSON: {}", e)))
}
