//! Check-in and user routes

use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::db::schemas::NewCheckIn;
use crate::routes::response::{json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

/// Request body for POST /users
#[derive(Debug, Deserialize)]
pub struct UserNameRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
}

/// POST /check-in, POST /checkin
pub async fn record_check_in(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let check_in: NewCheckIn = parse_json(body)?;
    let check_in = state.services.check_ins.record(check_in).await?;
    Ok(json_response(
        StatusCode::CREATED,
        &json!({ "message": "Check-in successful!", "checkIn": check_in }),
    ))
}

/// GET /check-ins/:userID
pub async fn list_check_ins(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let check_ins = state.services.check_ins.list_for_user(user_id).await?;
    Ok(json_response(StatusCode::OK, &check_ins))
}

/// GET /social-points/:userID
pub async fn social_points(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let total = state.services.check_ins.social_points(user_id).await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "totalSocialPoints": total }),
    ))
}

/// POST /users
pub async fn set_user_name(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: UserNameRequest = parse_json(body)?;
    let user = state
        .services
        .check_ins
        .set_name(&request.user_id, &request.name)
        .await?;
    Ok(json_response(StatusCode::OK, &user))
}
