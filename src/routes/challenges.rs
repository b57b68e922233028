//! Challenge routes

use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::db::schemas::NewChallenge;
use crate::routes::response::{json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    #[serde(rename = "challengeID")]
    pub challenge_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    #[serde(rename = "challengeID")]
    pub challenge_id: String,
    pub increment: i64,
}

/// POST /challenges
pub async fn create_challenge(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let challenge: NewChallenge = parse_json(body)?;
    let challenge = state.services.challenges.create(challenge).await?;
    Ok(json_response(StatusCode::CREATED, &challenge))
}

/// GET /challenges/:challengeID
pub async fn get_challenge(state: &AppState, challenge_id: &str) -> Result<HttpResponse> {
    let challenge = state.services.challenges.get(challenge_id).await?;
    Ok(json_response(StatusCode::OK, &challenge))
}

/// POST /challenges/join
pub async fn join_challenge(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: JoinRequest = parse_json(body)?;
    let challenge = state
        .services
        .challenges
        .join(&request.challenge_id, &request.user_id)
        .await?;
    Ok(json_response(StatusCode::OK, &challenge))
}

/// POST /challenges/progress
pub async fn record_progress(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: ProgressRequest = parse_json(body)?;
    let challenge = state
        .services
        .challenges
        .record_progress(&request.challenge_id, request.increment)
        .await?;
    let completed = challenge.is_complete();
    Ok(json_response(
        StatusCode::OK,
        &json!({ "challenge": challenge, "completed": completed }),
    ))
}
