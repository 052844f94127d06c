use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::ExtractionError;
use crate::analysis::pipeline::PipelineError;
use crate::analysis::store::PersistenceError;
use crate::llm_client::AnalysisRequestError;
use crate::models::resume::AnalysisOutcome;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM error: {0}")]
    Llm(#[from] AnalysisRequestError),

    /// Store failure. `analysis` carries the model's output when the failure
    /// happened after a successful completion.
    #[error("Persistence error: {source}")]
    Persistence {
        source: PersistenceError,
        analysis: Option<Box<AnalysisOutcome>>,
    },
}

impl From<PersistenceError> for AppError {
    fn from(source: PersistenceError) -> Self {
        AppError::Persistence {
            source,
            analysis: None,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(e) => AppError::Extraction(e),
            PipelineError::AnalysisRequest(e) => AppError::Llm(e),
            PipelineError::Persistence { source, outcome } => AppError::Persistence {
                source,
                analysis: Some(Box::new(outcome)),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, analysis) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg, None)
            }
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e}");
                (
                    StatusCode::BAD_REQUEST,
                    "EXTRACTION_ERROR",
                    "The uploaded file could not be read as a PDF".to_string(),
                    None,
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The analysis service failed to respond".to_string(),
                    None,
                )
            }
            AppError::Persistence { source, analysis } => {
                tracing::error!("Persistence error: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "The analysis could not be stored".to_string(),
                    analysis,
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(analysis) = analysis {
            body["analysis"] = json!(analysis);
        }

        (status, Json(body)).into_response()
    }
}
