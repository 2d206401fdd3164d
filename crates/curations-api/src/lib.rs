pub mod error;
pub mod forum;
pub mod ideas;
pub mod votes;

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use curations_forum::ForumHandle;
use curations_kv::Namespace;

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub votes: Namespace,
    pub ideas: Namespace,
    /// `None` when the forum feature is disabled by configuration;
    /// forum routes answer 503 in that case.
    pub forum: Option<ForumHandle>,
}

/// Assemble the full HTTP surface: routes, fallback, CORS policy,
/// request traces.
pub fn app(state: AppState) -> Router {
    // One permissive policy for every response, preflight included
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    // Method mismatches share the 404 fallback: the surface answers
    // "not found", never 405.
    Router::new()
        .route(
            "/api/vote",
            post(votes::cast_vote).options(preflight).fallback(not_found),
        )
        .route(
            "/api/votes",
            get(votes::list_votes).options(preflight).fallback(not_found),
        )
        .route(
            "/api/vote/{id}",
            get(votes::vote_status)
                .options(preflight)
                .fallback(not_found),
        )
        .route(
            "/api/idea",
            post(ideas::create_idea)
                .options(preflight)
                .fallback(not_found),
        )
        .route(
            "/api/ideas",
            get(ideas::list_ideas).options(preflight).fallback(not_found),
        )
        .route(
            "/api/forum",
            get(forum::list_posts)
                .post(forum::create_post)
                .options(preflight)
                .fallback(not_found),
        )
        .route(
            "/api/forum/{*rest}",
            get(forum::list_posts)
                .post(forum::create_post)
                .options(preflight)
                .fallback(not_found),
        )
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bare OPTIONS probe; the CORS layer fills in the headers.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Serialize)]
struct NotFound {
    error: &'static str,
    path: String,
}

async fn not_found(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(NotFound {
            error: "Not found",
            path: uri.path().to_string(),
        }),
    )
        .into_response()
}
