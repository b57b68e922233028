//! Health check endpoint
//!
//! `/health` and `/healthz` are liveness probes: they answer 200 whenever
//! the process is serving requests and report which storage backend is in
//! use.

use hyper::StatusCode;
use serde::Serialize;

use crate::routes::response::{json_response, HttpResponse};
use crate::server::AppState;

/// Liveness probe payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Storage backend (`mongodb` or `memory`)
    pub storage: &'static str,
}

/// Handle health request
pub fn health_check(state: &AppState) -> HttpResponse {
    let health = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        storage: state.store.backend(),
    };
    json_response(StatusCode::OK, &health)
}
