//! Notification routes

use hyper::StatusCode;

use crate::db::schemas::NewNotification;
use crate::routes::response::{json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

/// POST /notifications
pub async fn create_notification(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let notification: NewNotification = parse_json(body)?;
    let notification = state.services.notifications.create(notification).await?;
    Ok(json_response(StatusCode::CREATED, &notification))
}

/// GET /notifications/:user_id
pub async fn list_notifications(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let notifications = state.services.notifications.list_for_user(user_id).await?;
    Ok(json_response(StatusCode::OK, &notifications))
}

/// PUT /notifications/:id/read
pub async fn mark_read(state: &AppState, id: &str) -> Result<HttpResponse> {
    let notification = state.services.notifications.mark_read(id).await?;
    Ok(json_response(StatusCode::OK, &notification))
}
