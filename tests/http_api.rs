//! End-to-end tests of the HTTP surface against in-memory storage

use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_test::assert_ok;

use hearth::db::MemoryStore;
use hearth::{handle_request, AppState, Args};

fn state_with(args: &[&str]) -> Arc<AppState> {
    let mut argv = vec!["hearth", "--dev-mode"];
    argv.extend_from_slice(args);
    Arc::new(AppState::new(
        Args::parse_from(argv),
        Arc::new(MemoryStore::new()),
    ))
}

fn state() -> Arc<AppState> {
    state_with(&[])
}

async fn call_raw(
    state: &Arc<AppState>,
    method: Method,
    path: &str,
    body: impl Into<Bytes>,
) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Full::new(body.into()))
        .unwrap();

    let response = handle_request(Arc::clone(state), request).await;
    let status = response.status();
    let collected = assert_ok!(response.into_body().collect().await);
    (status, collected.to_bytes())
}

async fn call(
    state: &Arc<AppState>,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let (status, bytes) = call_raw(state, method, path, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn root_says_hello() {
    let state = state();
    let (status, body) = call_raw(&state, Method::GET, "/", Bytes::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Bytes::from_static(b"Hello, world!"));
}

#[tokio::test]
async fn health_and_status_report_storage() {
    let state = state();
    let (status, health) = call(&state, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["healthy"], true);
    assert_eq!(health["storage"], "memory");

    let (_, status_body) = call(&state, Method::GET, "/status", None).await;
    assert_eq!(status_body["service"], "hearth");
    assert_eq!(status_body["devMode"], true);
}

#[tokio::test]
async fn unknown_route_and_preflight() {
    let state = state();
    let (status, body) = call(&state, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], "/nope");

    let (status, _) = call(&state, Method::OPTIONS, "/createEvent", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let state = state_with(&["--max-body-bytes", "16"]);
    let (status, body) = call(
        &state,
        Method::POST,
        "/notifications",
        Some(json!({ "user_id": "u1", "type": "info", "message": "well over sixteen bytes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("exceeds"));
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn calendar_visibility() {
    let state = state();
    let (status, created) = call(
        &state,
        Method::POST,
        "/calendar/create",
        Some(json!({
            "creator": "alice",
            "title": "Picnic",
            "time": "2024-06-02T12:00:00Z",
            "visibility": "public"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["event"]["title"], "Picnic");

    let (status, _) = call(
        &state,
        Method::POST,
        "/createEvent",
        Some(json!({
            "creator": "alice",
            "title": "Dinner",
            "time": "2024-06-01T19:00:00Z",
            "visibility": "private",
            "invited": ["bob smith"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, public) = call(&state, Method::GET, "/calendar/public", None).await;
    let public = public.as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["visibility"], "public");

    let (_, invited) = call(&state, Method::GET, "/calendar/invited/bob%20smith", None).await;
    assert_eq!(invited.as_array().unwrap().len(), 1);
    assert_eq!(invited[0]["title"], "Dinner");

    let (_, all) = call(&state, Method::GET, "/getEvents", None).await;
    assert_eq!(all[0]["title"], "Dinner");
    assert_eq!(all[1]["title"], "Picnic");
}

#[tokio::test]
async fn event_validation_errors() {
    let state = state();
    let (status, body) = call(
        &state,
        Method::POST,
        "/createEvent",
        Some(json!({ "creator": "alice", "time": "2024-06-02", "visibility": "public" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));

    let (status, body) = call(
        &state,
        Method::POST,
        "/calendar/create",
        Some(json!({ "creator": "alice", "title": "X", "time": "t", "visibility": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

// ============================================================================
// Check-ins
// ============================================================================

#[tokio::test]
async fn check_ins_accumulate_points() {
    let state = state();
    for (path, location, points) in [("/check-in", "Park", 10), ("/checkin", "Cafe", 5)] {
        let (status, body) = call(
            &state,
            Method::POST,
            path,
            Some(json!({ "userID": "u1", "location": location, "socialPoints": points })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["checkIn"]["location"], location);
    }

    let (_, points) = call(&state, Method::GET, "/social-points/u1", None).await;
    assert_eq!(points["totalSocialPoints"], 15);

    let (_, check_ins) = call(&state, Method::GET, "/check-ins/u1", None).await;
    assert_eq!(check_ins.as_array().unwrap().len(), 2);

    let (status, _) = call(&state, Method::GET, "/check-ins/u9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, user) = call(
        &state,
        Method::POST,
        "/users",
        Some(json!({ "userID": "u1", "name": "Ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Ada");
    assert_eq!(user["totalSocialPoints"], 15);
}

// ============================================================================
// Achievements and goals
// ============================================================================

#[tokio::test]
async fn goal_completes_after_reaching_target() {
    let state = state();
    let (status, added) = call(
        &state,
        Method::POST,
        "/user/add-goal",
        Some(json!({ "userID": "u1", "goalName": "Walk5k", "target": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["goals"][0]["progress"], 0);

    let advance = json!({ "userID": "u1", "goalName": "Walk5k", "increment": 3 });
    let (_, first) = call(&state, Method::POST, "/user/progress", Some(advance.clone())).await;
    assert_eq!(first["currentGoals"][0]["progress"], 3);

    let (_, second) = call(&state, Method::POST, "/user/progress", Some(advance)).await;
    assert_eq!(second["currentGoals"].as_array().unwrap().len(), 0);
    assert_eq!(second["socialGoals"]["dailyGoalsCompleted"], 1);

    let (status, _) = call(
        &state,
        Method::POST,
        "/user/progress",
        Some(json!({ "userID": "ghost", "goalName": "Walk5k", "increment": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn achievement_flows() {
    let state = state();
    let (status, _) = call(
        &state,
        Method::POST,
        "/achievements",
        Some(json!({
            "name": "Explorer",
            "criteria": { "checkIns": 5 },
            "reward": { "badge": "compass", "points": 20 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let grant = json!({ "userID": "u1", "achievementName": "Explorer" });
    let (_, granted) = call(&state, Method::POST, "/user/add-achievement", Some(grant)).await;
    assert_eq!(granted["achievements"], json!(["compass"]));

    let (status, body) = call(
        &state,
        Method::POST,
        "/user/add-achievement",
        Some(json!({ "userID": "u1", "achievementName": "Unknown" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Achievement not found");

    let unlock = json!({ "userID": "u1", "achievementName": "Night Owl" });
    call(&state, Method::POST, "/unlock-achievement", Some(unlock.clone())).await;
    let (_, unlocked) = call(&state, Method::POST, "/unlock-achievement", Some(unlock)).await;
    assert_eq!(unlocked["achievements"], json!(["compass", "Night Owl"]));

    let (_, listed) = call(&state, Method::GET, "/user/achievements/u1", None).await;
    assert_eq!(listed, json!(["compass", "Night Owl"]));

    let (status, _) = call(&state, Method::GET, "/user/achievements/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Friendship
// ============================================================================

#[tokio::test]
async fn trust_is_capped_at_one_hundred() {
    let state = state();
    let (status, _) = call(
        &state,
        Method::POST,
        "/friendship/create",
        Some(json!({ "userID": "u1", "friendID": "u2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &state,
        Method::PATCH,
        "/friendship/updateTrust",
        Some(json!({ "userID": "u1", "friendID": "u2", "amount": 80 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "trustLevel": 100 }));

    let (status, body) = call(
        &state,
        Method::PATCH,
        "/friendship/updateTrust",
        Some(json!({ "userID": "u2", "friendID": "u1", "amount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Friendship not found");
}

#[tokio::test]
async fn friendship_score_defaults_to_one() {
    let state = state();
    let pair = json!({ "userA": "zoe", "userB": "amy" });
    call(&state, Method::POST, "/update-friendship", Some(pair)).await;
    let (_, body) = call(
        &state,
        Method::POST,
        "/update-friendship",
        Some(json!({ "userA": "amy", "userB": "zoe", "amount": 2 })),
    )
    .await;
    assert_eq!(body["friendship"]["score"], 3);
    assert_eq!(body["friendship"]["userA"], "amy");
}

// ============================================================================
// Groups
// ============================================================================

#[tokio::test]
async fn group_membership_round_trip() {
    let state = state();
    let (status, created) = call(
        &state,
        Method::POST,
        "/create-group",
        Some(json!({ "name": "Hikers", "members": ["u1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = created["group"]["_id"].as_str().unwrap().to_string();

    let (_, groups) = call(&state, Method::GET, "/user/groups/u1", None).await;
    assert_eq!(groups[0]["name"], "Hikers");

    let join = json!({ "groupID": group_id, "userID": "u2" });
    call(&state, Method::POST, "/add-to-group", Some(join.clone())).await;
    let (status, added) = call(&state, Method::POST, "/add-to-group", Some(join)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["group"]["members"], json!(["u1", "u2"]));

    let (_, removed) = call(
        &state,
        Method::POST,
        "/remove-from-group",
        Some(json!({ "groupID": group_id, "userID": "u1" })),
    )
    .await;
    assert_eq!(removed["group"]["members"], json!(["u2"]));

    let (_, fetched) = call(&state, Method::GET, &format!("/group/{}", group_id), None).await;
    assert_eq!(fetched["members"], json!(["u2"]));

    let (status, body) = call(
        &state,
        Method::POST,
        "/add-to-group",
        Some(json!({ "groupID": "missing", "userID": "u1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Group not found");

    let (status, _) = call(&state, Method::GET, "/user/groups/stranger", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn notifications_lifecycle() {
    let state = state();
    let (status, created) = call(
        &state,
        Method::POST,
        "/notifications",
        Some(json!({ "user_id": "u1", "type": "friend_request", "message": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["read"], false);
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, read) = call(&state, Method::PUT, &format!("/notifications/{}/read", id), None).await;
    assert_eq!(read["read"], true);

    let (_, listed) = call(&state, Method::GET, "/notifications/u1", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = call(&state, Method::PUT, "/notifications/xyz/read", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Notification not found");

    let (status, _) = call(
        &state,
        Method::POST,
        "/notifications",
        Some(json!({ "user_id": "u1", "message": "no type" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Challenges
// ============================================================================

#[tokio::test]
async fn challenge_progress_reports_completion() {
    let state = state();
    let (status, _) = call(
        &state,
        Method::POST,
        "/challenges",
        Some(json!({
            "challengeID": "steps",
            "description": "Walk together",
            "goal": 5,
            "reward": "Trailblazer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, joined) = call(
        &state,
        Method::POST,
        "/challenges/join",
        Some(json!({ "challengeID": "steps", "userID": "u1" })),
    )
    .await;
    assert_eq!(joined["participants"], json!(["u1"]));

    let (_, progress) = call(
        &state,
        Method::POST,
        "/challenges/progress",
        Some(json!({ "challengeID": "steps", "increment": 5 })),
    )
    .await;
    assert_eq!(progress["completed"], true);

    let (_, fetched) = call(&state, Method::GET, "/challenges/steps", None).await;
    assert_eq!(fetched["progress"], 5);

    let (status, _) = call(&state, Method::GET, "/challenges/none", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
