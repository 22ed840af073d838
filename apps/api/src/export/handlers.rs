use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{export_pdf, export_png, resolve_file_name, write_all, ExportFile};
use crate::pagination::handlers::find_session;
use crate::render::render_snapshot;
use crate::state::AppState;

/// `file_name: null` (or absent) means the name prompt was declined.
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Serialize)]
pub struct EncodedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub data_base64: String,
}

impl From<&ExportFile> for EncodedFile {
    fn from(file: &ExportFile) -> Self {
        EncodedFile {
            file_name: file.file_name.clone(),
            content_type: file.content_type,
            data_base64: STANDARD.encode(&file.bytes),
        }
    }
}

fn attachment_header(file_name: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_bytes(format!("attachment; filename=\"{file_name}\"").as_bytes())
        .map_err(|_| AppError::Validation(format!("file name {file_name:?} cannot be sent as an attachment")))
}

async fn save_copies(state: &AppState, files: &[ExportFile]) -> Result<(), AppError> {
    if let Some(dir) = &state.config.export_dir {
        write_all(dir, files).await?;
    }
    Ok(())
}

/// POST /api/v1/sessions/:id/export/png
pub async fn handle_export_png(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let Some(name) = resolve_file_name(req.file_name.as_deref()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let snapshot = session.snapshot();
    let engine = state.sessions.engine();
    let rasterizer = Arc::clone(&state.rasterizer);
    let files = tokio::task::spawn_blocking(move || {
        let stack = render_snapshot(&engine, &snapshot);
        export_png(&rasterizer, &stack, &name)
    })
    .await
    .context("png export task failed")??;

    if files.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    save_copies(&state, &files).await?;

    let encoded: Vec<EncodedFile> = files.iter().map(EncodedFile::from).collect();
    Ok(Json(encoded).into_response())
}

/// POST /api/v1/sessions/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let Some(name) = resolve_file_name(req.file_name.as_deref()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let snapshot = session.snapshot();
    let engine = state.sessions.engine();
    let rasterizer = Arc::clone(&state.rasterizer);
    let file = tokio::task::spawn_blocking(move || {
        let stack = render_snapshot(&engine, &snapshot);
        export_pdf(&rasterizer, &stack, &name)
    })
    .await
    .context("pdf export task failed")??;

    let Some(file) = file else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let disposition = attachment_header(&file.file_name)?;
    save_copies(&state, std::slice::from_ref(&file)).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
