//! Axum route handlers for the analysis JSON API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::AnalysisOutcome;
use crate::state::AppState;

/// Header carrying the stored document id on a successful analysis.
pub const ANALYSIS_ID_HEADER: &str = "x-analysis-id";
const FILE_FIELD: &str = "file";

/// The uploaded résumé from a multipart form.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

/// Oversized bodies surface here as multipart errors carrying 413.
fn upload_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {err}"))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

/// Reads the `file` field of a multipart form, draining any other fields.
pub async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("malformed multipart body", e))?
    {
        if field.name() == Some(FILE_FIELD) && upload.is_none() {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| upload_error("could not read upload", e))?;
            upload = Some(Upload { file_name, data });
        } else {
            field
                .bytes()
                .await
                .map_err(|e| upload_error("malformed multipart body", e))?;
        }
    }
    Ok(upload)
}

#[derive(Debug, Serialize)]
pub struct StoredAnalysisResponse {
    pub id: Uuid,
    pub resume_data: AnalysisOutcome,
    pub timestamp: DateTime<Utc>,
}

/// POST /analyze_resume/
///
/// Body is the parsed record, or `{"raw_response": ...}` when the model's
/// reply could not be parsed.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation(format!("multipart field '{FILE_FIELD}' is required")))?;
    info!(
        "Analyzing upload '{}' ({} bytes)",
        upload.file_name,
        upload.data.len()
    );

    let result = state.pipeline.run(upload.data).await?;
    Ok((
        [(ANALYSIS_ID_HEADER, result.id.to_string())],
        Json(result.outcome),
    ))
}

/// GET /analyze_resume/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredAnalysisResponse>, AppError> {
    let document = state
        .pipeline
        .fetch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;

    Ok(Json(StoredAnalysisResponse {
        id,
        resume_data: document.resume_data,
        timestamp: document.timestamp,
    }))
}
