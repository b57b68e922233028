//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; every connection is served on its own task
//! and shares one [`AppState`].

use bytes::Bytes;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::db::DocumentStore;
use crate::routes::{
    self, challenges, checkins, error_response, events, friendship, groups, not_found_response,
    notifications, preflight_response, progress, read_body, text_response, HttpResponse,
};
use crate::services::Services;
use crate::types::HearthError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn DocumentStore>,
    pub services: Services,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn DocumentStore>) -> Self {
        let services = Services::new(Arc::clone(&store));
        Self {
            args,
            store,
            services,
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), HearthError> {
    let listen = state.args.listen();
    let listener = TcpListener::bind(listen).await?;

    info!(
        "Hearth listening on {} (storage: {})",
        listen,
        state.store.backend()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("Connection from {}", addr);
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, Infallible>(handle_request(state, req).await) }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route an incoming HTTP request
pub async fn handle_request<B>(state: Arc<AppState>, req: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("{} {}", method, path);

    if method == Method::OPTIONS {
        return preflight_response();
    }

    let body = match read_body(req.into_body(), state.args.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    let segments = path_segments(&path);
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    let state = state.as_ref();

    let result = match (method, segments.as_slice()) {
        (Method::GET, []) => Ok(text_response(StatusCode::OK, "Hello, world!")),

        // Health and status
        (Method::GET, ["health"] | ["healthz"]) => Ok(routes::health_check(state)),
        (Method::GET, ["status"]) => Ok(routes::status_check(state)),

        // Events
        (Method::POST, ["createEvent"]) => events::create_event(state, &body).await,
        (Method::GET, ["getEvents"]) => events::list_events(state).await,
        (Method::POST, ["calendar", "create"]) => {
            events::create_calendar_event(state, &body).await
        }
        (Method::GET, ["calendar", "public"]) => events::public_events(state).await,
        (Method::GET, ["calendar", "invited", username]) => {
            events::invited_events(state, username).await
        }

        // Check-ins and users
        (Method::POST, ["check-in"] | ["checkin"]) => {
            checkins::record_check_in(state, &body).await
        }
        (Method::GET, ["check-ins", user_id]) => checkins::list_check_ins(state, user_id).await,
        (Method::GET, ["social-points", user_id]) => checkins::social_points(state, user_id).await,
        (Method::POST, ["users"]) => checkins::set_user_name(state, &body).await,

        // Achievements
        (Method::GET, ["user", "achievements", user_id]) => {
            progress::user_achievements(state, user_id).await
        }
        (Method::POST, ["user", "add-achievement"]) => {
            progress::grant_achievement(state, &body).await
        }
        (Method::POST, ["unlock-achievement"]) => progress::unlock_achievement(state, &body).await,
        (Method::POST, ["achievements"]) => progress::define_achievement(state, &body).await,
        (Method::GET, ["achievements"]) => progress::list_achievements(state).await,

        // Goals and favorites
        (Method::POST, ["user", "add-goal"]) => progress::add_goal(state, &body).await,
        (Method::POST, ["user", "progress"]) => progress::update_goal_progress(state, &body).await,
        (Method::GET, ["user", "progress", user_id]) => progress::get_progress(state, user_id).await,
        (Method::POST, ["user", "favorites"]) => progress::add_favorite(state, &body).await,
        (Method::GET, ["user", "favorites", user_id]) => {
            progress::list_favorites(state, user_id).await
        }

        // Friendship
        (Method::PATCH, ["friendship", "updateTrust"]) => {
            friendship::update_trust(state, &body).await
        }
        (Method::POST, ["friendship", "create"]) => friendship::create_friends(state, &body).await,
        (Method::GET, ["friendship", user_id]) => friendship::list_friends(state, user_id).await,
        (Method::POST, ["update-friendship"]) => {
            friendship::record_interaction(state, &body).await
        }

        // Groups
        (Method::POST, ["create-group"]) => groups::create_group(state, &body).await,
        (Method::POST, ["add-to-group"]) => groups::add_member(state, &body).await,
        (Method::POST, ["remove-from-group"]) => groups::remove_member(state, &body).await,
        (Method::GET, ["group", group_id]) => groups::get_group(state, group_id).await,
        (Method::GET, ["user", "groups", user_id]) => groups::user_groups(state, user_id).await,

        // Notifications
        (Method::POST, ["notifications"]) => {
            notifications::create_notification(state, &body).await
        }
        (Method::GET, ["notifications", user_id]) => {
            notifications::list_notifications(state, user_id).await
        }
        (Method::PUT, ["notifications", id, "read"]) => notifications::mark_read(state, id).await,

        // Challenges
        (Method::POST, ["challenges"]) => challenges::create_challenge(state, &body).await,
        (Method::POST, ["challenges", "join"]) => challenges::join_challenge(state, &body).await,
        (Method::POST, ["challenges", "progress"]) => {
            challenges::record_progress(state, &body).await
        }
        (Method::GET, ["challenges", challenge_id]) => {
            challenges::get_challenge(state, challenge_id).await
        }

        _ => Ok(not_found_response(&path)),
    };

    result.unwrap_or_else(error_response)
}

/// Split a path into percent-decoded segments, ignoring empty ones
fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .collect()
}
