use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use curations_forum::ForumHandle;
use curations_types::api::{CreateForumPost, ForumPost};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ForumQuery {
    pub channel: Option<String>,
}

fn forum(state: &AppState) -> Result<&ForumHandle, ApiError> {
    state.forum.as_ref().ok_or_else(|| {
        ApiError::Unavailable(
            "Forum feature not available. Set CURATIONS_FORUM_ENABLED to turn it on.".to_string(),
        )
    })
}

/// POST /api/forum — append a post through the serialized actor.
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreateForumPost>,
) -> Result<(StatusCode, Json<ForumPost>), ApiError> {
    let post = forum(&state)?
        .append(req)
        .await
        .map_err(|e| ApiError::internal("Failed to post to forum", e))?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/forum — one channel's posts with `?channel=`, otherwise
/// the full channel directory.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ForumQuery>,
) -> Result<Response, ApiError> {
    let forum = forum(&state)?;

    match query.channel {
        Some(channel) => {
            let posts = forum
                .posts(&channel)
                .await
                .map_err(|e| ApiError::internal("Failed to fetch forum posts", e))?;
            Ok(Json(posts).into_response())
        }
        None => {
            let channels = forum
                .channels()
                .await
                .map_err(|e| ApiError::internal("Failed to fetch forum channels", e))?;
            Ok(Json(channels).into_response())
        }
    }
}
