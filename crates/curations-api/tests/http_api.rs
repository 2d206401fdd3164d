/// End-to-end tests for the HTTP surface: the real router over a real
/// SQLite-backed store, requests driven through tower's `oneshot`.
use std::fs;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use curations_api::AppState;
use curations_forum::{FORUM_INSTANCE, ForumRegistry};
use curations_kv::KvStore;

fn open_store(name: &str) -> Arc<KvStore> {
    let path = std::env::temp_dir().join(format!(
        "curations_api_{}_{}.db",
        std::process::id(),
        name
    ));
    let _ = fs::remove_file(&path);
    Arc::new(KvStore::open(&path).expect("open kv store"))
}

fn test_app(name: &str) -> Router {
    let store = open_store(name);
    let registry = ForumRegistry::new(store.clone());
    let state = AppState {
        votes: store.namespace("votes"),
        ideas: store.namespace("ideas"),
        forum: Some(registry.get_or_spawn(FORUM_INSTANCE)),
    };
    curations_api::app(state)
}

fn forumless_app(name: &str) -> Router {
    let store = open_store(name);
    let state = AppState {
        votes: store.namespace("votes"),
        ideas: store.namespace("ideas"),
        forum: None,
    };
    curations_api::app(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

// -- Votes --

#[tokio::test]
async fn repeated_votes_accumulate() {
    let app = test_app("votes_accumulate");

    for expected in 1..=3u64 {
        let (status, body) = send(&app, post_json("/api/vote", json!({"id": "proj-a"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "proj-a");
        assert_eq!(body["votes"], expected);
    }

    let (status, body) = send(&app, get("/api/votes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"proj-a": 3}));
}

#[tokio::test]
async fn missing_vote_id_is_rejected() {
    let app = test_app("votes_missing_id");

    let (status, body) = send(&app, post_json("/api/vote", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"].as_str().unwrap().contains("'id'"),
        "error should name the missing field: {body}"
    );
}

#[tokio::test]
async fn unseen_vote_id_reports_zero() {
    let app = test_app("votes_unseen");

    let (status, body) = send(&app, get("/api/vote/never-voted")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "never-voted", "count": 0, "exists": false}));
}

#[tokio::test]
async fn vote_status_reflects_cast_votes() {
    let app = test_app("votes_status");

    send(&app, post_json("/api/vote", json!({"id": "proj-b"}))).await;
    send(&app, post_json("/api/vote", json!({"id": "proj-b"}))).await;

    let (status, body) = send(&app, get("/api/vote/proj-b")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "proj-b", "count": 2, "exists": true}));
}

// -- Ideas --

#[tokio::test]
async fn submitted_idea_appears_in_listing() {
    let app = test_app("ideas_roundtrip");

    let (status, created) = send(
        &app,
        post_json(
            "/api/idea",
            json!({
                "title": "Weekly Vibe Check",
                "description": "Async prompts for the community",
                "categories": ["community"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["votes"], 0);
    assert_eq!(created["title"], "Weekly Vibe Check");
    assert!(created["id"].is_string());
    assert!(created["createdAt"].is_string());

    let (status, listed) = send(&app, get("/api/ideas")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
    assert_eq!(listed[0]["description"], "Async prompts for the community");
}

#[tokio::test]
async fn idea_categories_default_to_empty() {
    let app = test_app("ideas_default_categories");

    let (status, created) = send(
        &app,
        post_json(
            "/api/idea",
            json!({"title": "No tags", "description": "Plain idea"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["categories"], json!([]));
}

#[tokio::test]
async fn ideas_listing_is_newest_first() {
    let app = test_app("ideas_ordering");

    send(
        &app,
        post_json("/api/idea", json!({"title": "older", "description": "d"})),
    )
    .await;
    send(
        &app,
        post_json("/api/idea", json!({"title": "newer", "description": "d"})),
    )
    .await;

    let (status, listed) = send(&app, get("/api/ideas")).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|idea| idea["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["newer", "older"]);
}

// -- Forum --

#[tokio::test]
async fn forum_post_applies_defaults() {
    let app = test_app("forum_defaults");

    let (status, created) = send(
        &app,
        post_json(
            "/api/forum",
            json!({"channel": "general", "title": "A", "message": "B"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author"], "Anonymous");

    let (status, posts) = send(&app, get("/api/forum?channel=general")).await;
    assert_eq!(status, StatusCode::OK);
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "A");
    assert_eq!(posts[0]["message"], "B");
    assert_eq!(posts[0]["author"], "Anonymous");
}

#[tokio::test]
async fn forum_directory_lists_every_channel() {
    let app = test_app("forum_directory");

    send(
        &app,
        post_json(
            "/api/forum",
            json!({"channel": "alpha", "title": "a1", "message": "m"}),
        ),
    )
    .await;
    send(
        &app,
        post_json(
            "/api/forum",
            json!({"channel": "beta", "title": "b1", "message": "m"}),
        ),
    )
    .await;

    let (status, body) = send(&app, get("/api/forum")).await;
    assert_eq!(status, StatusCode::OK);
    let mut channels: Vec<(&str, usize)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| {
            (
                entry["channel"].as_str().unwrap(),
                entry["posts"].as_array().unwrap().len(),
            )
        })
        .collect();
    channels.sort();
    assert_eq!(channels, vec![("alpha", 1), ("beta", 1)]);
}

#[tokio::test]
async fn unseen_forum_channel_is_empty_list() {
    let app = test_app("forum_unseen");

    let (status, posts) = send(&app, get("/api/forum?channel=nobody-here")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posts, json!([]));
}

#[tokio::test]
async fn disabled_forum_answers_503() {
    let app = forumless_app("forum_disabled");

    let (status, body) = send(&app, get("/api/forum")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        post_json("/api/forum", json!({"title": "t", "message": "m"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// -- Cross-cutting --

#[tokio::test]
async fn preflight_carries_cors_headers() {
    let app = test_app("cors_preflight");

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/vote")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_MAX_AGE)
            .and_then(|v| v.to_str().ok()),
        Some("86400")
    );

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn bare_options_is_accepted_on_any_path() {
    let app = test_app("options_anywhere");

    for uri in ["/api/vote", "/api/forum", "/definitely/not/a/route"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("request failed");
        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {uri}");
    }
}

#[tokio::test]
async fn cors_applies_to_regular_responses() {
    let app = test_app("cors_regular");

    let request = Request::builder()
        .uri("/api/votes")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("request failed");
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn unknown_path_is_404_with_error_body() {
    let app = test_app("not_found");

    let (status, body) = send(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
    assert_eq!(body["path"], "/api/nope");
}

#[tokio::test]
async fn method_mismatch_is_404_not_405() {
    let app = test_app("method_mismatch");

    let (status, body) = send(&app, get("/api/vote")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app("health");

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
