//! Group routes

use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::db::schemas::NewGroup;
use crate::routes::response::{json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

/// Request body for adding or removing a member
#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
}

/// POST /create-group
pub async fn create_group(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let group: NewGroup = parse_json(body)?;
    let group = state.services.groups.create(group).await?;
    Ok(json_response(
        StatusCode::CREATED,
        &json!({ "message": "Group created successfully!", "group": group }),
    ))
}

/// POST /add-to-group
pub async fn add_member(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: MembershipRequest = parse_json(body)?;
    let group = state
        .services
        .groups
        .add_member(&request.group_id, &request.user_id)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "User added to group successfully", "group": group }),
    ))
}

/// POST /remove-from-group
pub async fn remove_member(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: MembershipRequest = parse_json(body)?;
    let group = state
        .services
        .groups
        .remove_member(&request.group_id, &request.user_id)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "User removed from group successfully", "group": group }),
    ))
}

/// GET /group/:groupID
pub async fn get_group(state: &AppState, group_id: &str) -> Result<HttpResponse> {
    let group = state.services.groups.get(group_id).await?;
    Ok(json_response(StatusCode::OK, &group))
}

/// GET /user/groups/:userID
pub async fn user_groups(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let groups = state.services.groups.groups_for_user(user_id).await?;
    Ok(json_response(StatusCode::OK, &groups))
}
