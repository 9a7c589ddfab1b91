use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::candidates::store::StoreError;
use crate::evaluation::document::DocumentReadError;
use crate::evaluation::pipeline::PipelineError;
use crate::evaluation::resume::EvaluationBackendError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// The `code` field names the pipeline stage that failed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Document read error: {0}")]
    DocumentRead(#[from] DocumentReadError),

    #[error("Evaluation backend error: {0}")]
    EvaluationBackend(#[from] EvaluationBackendError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::DocumentRead(e) => AppError::DocumentRead(e),
            PipelineError::EvaluationBackend(e) => AppError::EvaluationBackend(e),
            PipelineError::Persistence(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upload(e) => (e.status(), "UPLOAD_ERROR", e.body_text()),
            AppError::DocumentRead(e) => {
                tracing::warn!("Document read error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "DOCUMENT_READ_ERROR",
                    format!("The resume could not be read: {e}"),
                )
            }
            AppError::EvaluationBackend(e) => {
                tracing::error!("Evaluation backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EVALUATION_BACKEND_ERROR",
                    "The evaluation backend could not be reached".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "The candidate record could not be stored".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
