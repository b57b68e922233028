//! Status endpoint for Hearth
//!
//! Provides runtime status information: version, storage backend and the
//! configuration the server was started with.

use hyper::StatusCode;
use serde::Serialize;

use crate::routes::response::{json_response, HttpResponse};
use crate::server::AppState;

/// Status response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Service name
    pub service: &'static str,
    /// Service version
    pub version: &'static str,
    /// Storage backend in use
    pub storage: &'static str,
    /// Whether dev mode is enabled
    pub dev_mode: bool,
    /// Bound address
    pub listen: String,
}

/// Handle status request
pub fn status_check(state: &AppState) -> HttpResponse {
    let status = StatusResponse {
        service: "hearth",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.store.backend(),
        dev_mode: state.args.dev_mode,
        listen: state.args.listen().to_string(),
    };
    json_response(StatusCode::OK, &status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let status = StatusResponse {
            service: "hearth",
            version: "0.1.0",
            storage: "mongodb",
            dev_mode: true,
            listen: "0.0.0.0:5000".to_string(),
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"service\":\"hearth\""));
        assert!(json.contains("\"devMode\":true"));
        assert!(json.contains("\"listen\":\"0.0.0.0:5000\""));
    }
}
