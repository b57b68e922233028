//! Event and calendar routes
//!
//! - `POST /createEvent`, `GET /getEvents`
//! - `POST /calendar/create`, `GET /calendar/public`,
//!   `GET /calendar/invited/:username`

use hyper::StatusCode;
use serde_json::json;

use crate::db::schemas::NewEvent;
use crate::routes::response::{error_response, json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

/// POST /createEvent
pub async fn create_event(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let event: NewEvent = parse_json(body)?;
    state.services.events.create(event).await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Event created!" }),
    ))
}

/// GET /getEvents
pub async fn list_events(state: &AppState) -> Result<HttpResponse> {
    let events = state.services.events.list_all().await?;
    Ok(json_response(StatusCode::OK, &events))
}

/// POST /calendar/create
///
/// Validation failures answer `{success: false, error}` rather than the
/// plain error body.
pub async fn create_calendar_event(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let created = match parse_json::<NewEvent>(body) {
        Ok(event) => state.services.events.create(event).await,
        Err(e) => Err(e),
    };

    Ok(match created {
        Ok(event) => json_response(
            StatusCode::CREATED,
            &json!({ "success": true, "event": event }),
        ),
        Err(e) if e.status_code() == StatusCode::BAD_REQUEST => json_response(
            StatusCode::BAD_REQUEST,
            &json!({ "success": false, "error": e.public_message() }),
        ),
        Err(e) => error_response(e),
    })
}

/// GET /calendar/public
pub async fn public_events(state: &AppState) -> Result<HttpResponse> {
    let events = state.services.events.list_public().await?;
    Ok(json_response(StatusCode::OK, &events))
}

/// GET /calendar/invited/:username
pub async fn invited_events(state: &AppState, username: &str) -> Result<HttpResponse> {
    let events = state.services.events.list_invited(username).await?;
    Ok(json_response(StatusCode::OK, &events))
}
