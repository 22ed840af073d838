use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::session::{paginate_once, PreviewInput, PreviewSession, PreviewSnapshot};
use crate::state::AppState;

/// Longest a snapshot request may wait for pagination to settle.
const MAX_WAIT_MS: u64 = 30_000;

#[derive(Deserialize)]
pub struct SnapshotQuery {
    pub wait_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub snapshot: PreviewSnapshot,
}

pub async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<PreviewSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/paginate
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(input): Json<PreviewInput>,
) -> Result<Json<PreviewSnapshot>, AppError> {
    let snapshot = paginate_once(
        state.sessions.engine(),
        state.sessions.clock(),
        &input,
        state.config.measure_safe_offset,
    )
    .await;
    Ok(Json(snapshot))
}

/// An empty body opens a blank session; anything else must be a valid `PreviewInput`.
fn parse_initial_input(body: &[u8]) -> Result<Option<PreviewInput>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::Validation(format!("Invalid preview input: {e}")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionCreated>), AppError> {
    let input = parse_initial_input(&body)?;
    let session = state.sessions.create().await;
    let snapshot = match input {
        Some(input) => session.apply(input),
        None => session.snapshot(),
    };
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: session.id(),
            snapshot,
        }),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_snapshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SnapshotQuery>,
) -> Result<Json<PreviewSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    let snapshot = match params.wait_ms {
        Some(ms) if ms > MAX_WAIT_MS => {
            return Err(AppError::Validation(format!(
                "wait_ms must be at most {MAX_WAIT_MS}"
            )))
        }
        Some(ms) => session.wait_until_settled(Duration::from_millis(ms)).await,
        None => session.snapshot(),
    };
    Ok(Json(snapshot))
}

/// PUT /api/v1/sessions/:id/input
pub async fn handle_update_input(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PreviewInput>,
) -> Result<(StatusCode, Json<PreviewSnapshot>), AppError> {
    let session = find_session(&state, id).await?;
    Ok((StatusCode::ACCEPTED, Json(session.apply(input))))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.close(id).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
