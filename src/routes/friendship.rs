//! Friendship routes
//!
//! `/friendship/*` works on trust/bond friends; `/update-friendship` on the
//! scored pair model.

use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::routes::response::{json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

#[derive(Debug, Deserialize)]
pub struct TrustRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "friendID")]
    pub friend_id: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFriendsRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "friendID")]
    pub friend_id: String,
    #[serde(default)]
    pub friendship_element: Option<String>,
    #[serde(default)]
    pub aura_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub user_a: String,
    pub user_b: String,
    #[serde(default = "default_amount")]
    pub amount: i64,
}

fn default_amount() -> i64 {
    1
}

/// PATCH /friendship/updateTrust
pub async fn update_trust(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: TrustRequest = parse_json(body)?;
    let trust_level = state
        .services
        .friendship
        .update_trust(&request.user_id, &request.friend_id, request.amount)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "success": true, "trustLevel": trust_level }),
    ))
}

/// POST /friendship/create
pub async fn create_friends(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: CreateFriendsRequest = parse_json(body)?;
    let friends = state
        .services
        .friendship
        .create_friends(
            &request.user_id,
            &request.friend_id,
            request.friendship_element,
            request.aura_color,
        )
        .await?;
    Ok(json_response(StatusCode::CREATED, &friends))
}

/// GET /friendship/:userID
pub async fn list_friends(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let friends = state.services.friendship.list_friends(user_id).await?;
    Ok(json_response(StatusCode::OK, &friends))
}

/// POST /update-friendship
pub async fn record_interaction(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: InteractionRequest = parse_json(body)?;
    let friendship = state
        .services
        .friendship
        .record_interaction(&request.user_a, &request.user_b, request.amount)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Friendship updated", "friendship": friendship }),
    ))
}
