//! Achievement, goal and favorites routes

use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::db::schemas::NewAchievement;
use crate::routes::response::{json_response, parse_json, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

#[derive(Debug, Deserialize)]
pub struct AchievementRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "achievementName")]
    pub achievement_name: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "goalName")]
    pub goal_name: String,
    pub target: i64,
}

#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "goalName")]
    pub goal_name: String,
    pub increment: i64,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
}

// ============================================================================
// Achievements
// ============================================================================

/// GET /user/achievements/:userID
pub async fn user_achievements(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let achievements = state.services.progress.achievements(user_id).await?;
    Ok(json_response(StatusCode::OK, &achievements))
}

/// POST /user/add-achievement
pub async fn grant_achievement(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: AchievementRequest = parse_json(body)?;
    let achievements = state
        .services
        .progress
        .grant_achievement(&request.user_id, &request.achievement_name)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Achievement added!", "achievements": achievements }),
    ))
}

/// POST /unlock-achievement
pub async fn unlock_achievement(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: AchievementRequest = parse_json(body)?;
    let achievements = state
        .services
        .progress
        .unlock_achievement(&request.user_id, &request.achievement_name)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Achievement unlocked!", "achievements": achievements }),
    ))
}

/// POST /achievements
pub async fn define_achievement(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let achievement: NewAchievement = parse_json(body)?;
    let achievement = state.services.progress.define_achievement(achievement).await?;
    Ok(json_response(StatusCode::CREATED, &achievement))
}

/// GET /achievements
pub async fn list_achievements(state: &AppState) -> Result<HttpResponse> {
    let achievements = state.services.progress.list_achievements().await?;
    Ok(json_response(StatusCode::OK, &achievements))
}

// ============================================================================
// Goals
// ============================================================================

/// POST /user/add-goal
pub async fn add_goal(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: GoalRequest = parse_json(body)?;
    let goals = state
        .services
        .progress
        .add_goal(&request.user_id, &request.goal_name, request.target)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Goal added!", "goals": goals }),
    ))
}

/// POST /user/progress
pub async fn update_goal_progress(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: GoalProgressRequest = parse_json(body)?;
    let record = state
        .services
        .progress
        .update_goal_progress(&request.user_id, &request.goal_name, request.increment)
        .await?;
    Ok(json_response(StatusCode::OK, &record))
}

/// GET /user/progress/:userID
pub async fn get_progress(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let record = state.services.progress.get(user_id).await?;
    Ok(json_response(StatusCode::OK, &record))
}

// ============================================================================
// Favorites
// ============================================================================

/// POST /user/favorites
pub async fn add_favorite(state: &AppState, body: &[u8]) -> Result<HttpResponse> {
    let request: FavoriteRequest = parse_json(body)?;
    let favorites = state
        .services
        .progress
        .add_favorite(&request.user_id, request.title, &request.url)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Favorite added!", "favorites": favorites }),
    ))
}

/// GET /user/favorites/:userID
pub async fn list_favorites(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let favorites = state.services.progress.favorites(user_id).await?;
    Ok(json_response(StatusCode::OK, &favorites))
}
