use anyhow::Context;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use curations_types::api::{CreateIdeaRequest, Idea};

use crate::AppState;
use crate::error::ApiError;

/// POST /api/idea — persist a new submission and echo the full record.
pub async fn create_idea(
    State(state): State<AppState>,
    Json(req): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<Idea>), ApiError> {
    let idea = Idea {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        categories: req.categories,
        votes: 0,
        created_at: Utc::now(),
    };

    let ideas = state.ideas.clone();
    let record = idea.clone();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        ideas.put(&record.id.to_string(), &serde_json::to_string(&record)?)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Failed to submit idea".to_string())
    })?
    .map_err(|e| ApiError::internal("Failed to submit idea", e))?;

    Ok((StatusCode::CREATED, Json(idea)))
}

/// GET /api/ideas — full listing, newest first. A stored record that
/// no longer parses fails the whole request; list endpoints never
/// return partial results.
pub async fn list_ideas(State(state): State<AppState>) -> Result<Json<Vec<Idea>>, ApiError> {
    let ideas = state.ideas.clone();
    let mut records = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<Idea>> {
        let mut records = Vec::new();
        for key in ideas.list()? {
            if let Some(raw) = ideas.get(&key)? {
                records.push(
                    serde_json::from_str(&raw)
                        .with_context(|| format!("corrupt idea record '{key}'"))?,
                );
            }
        }
        Ok(records)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Failed to fetch ideas".to_string())
    })?
    .map_err(|e| ApiError::internal("Failed to fetch ideas", e))?;

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(records))
}
