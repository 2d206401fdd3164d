use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use tracing::error;

use curations_types::api::{VoteRequest, VoteResponse, VoteStatus};

use crate::AppState;
use crate::error::ApiError;

/// POST /api/vote — bump the counter for one id.
///
/// The read-add-write sequence is not serialized across requests:
/// concurrent casts for the same id can lose an increment.
pub async fn cast_vote(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    if req.id.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing 'id' in vote payload".to_string(),
        ));
    }

    let votes = state.votes.clone();
    let id = req.id.clone();
    let total = tokio::task::spawn_blocking(move || -> anyhow::Result<u64> {
        let current = votes
            .get(&id)?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let total = current + 1;
        votes.put(&id, &total.to_string())?;
        Ok(total)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Failed to process vote".to_string())
    })?
    .map_err(|e| ApiError::internal("Failed to process vote", e))?;

    Ok(Json(VoteResponse {
        id: req.id,
        votes: total,
    }))
}

/// GET /api/votes — every counter as one id → count map. Any storage
/// error fails the whole request; a key deleted between list and get is
/// omitted rather than reported.
pub async fn list_votes(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    let votes = state.votes.clone();
    let counts = tokio::task::spawn_blocking(move || -> anyhow::Result<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        for key in votes.list()? {
            if let Some(value) = votes.get(&key)? {
                counts.insert(key, value.parse().unwrap_or(0));
            }
        }
        Ok(counts)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Failed to fetch votes".to_string())
    })?
    .map_err(|e| ApiError::internal("Failed to fetch votes", e))?;

    Ok(Json(counts))
}

/// GET /api/vote/{id} — count plus existence. Unknown ids report zero
/// rather than erroring.
pub async fn vote_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VoteStatus>, ApiError> {
    let votes = state.votes.clone();
    let key = id.clone();
    let stored = tokio::task::spawn_blocking(move || votes.get(&key))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("Failed to fetch vote".to_string())
        })?
        .map_err(|e| ApiError::internal("Failed to fetch vote", e))?;

    let exists = stored.is_some();
    let count = stored.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);

    Ok(Json(VoteStatus { id, count, exists }))
}
