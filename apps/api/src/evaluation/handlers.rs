use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::document::{CandidateDocument, DocumentFormat};
use crate::models::candidate::EvaluationResponse;
use crate::state::AppState;

struct ResumeUpload {
    document: CandidateDocument,
    job_description: String,
}

/// POST /parse_resume
///
/// Multipart fields: `resume` (a `.pdf` file) and `job_description` (text).
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        bytes = upload.document.bytes.len(),
        "Received resume for evaluation"
    );
    let record = state
        .pipeline
        .evaluate(upload.document, &upload.job_description)
        .await?;
    Ok(Json(record.to_response()))
}

async fn read_upload(multipart: &mut Multipart) -> Result<ResumeUpload, AppError> {
    let mut document = None;
    let mut job_description = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("resume") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let format = DocumentFormat::from_file_name(&file_name).ok_or_else(|| {
                    AppError::Validation("Only PDF files are supported".to_string())
                })?;
                let bytes = field.bytes().await?;
                document = Some(CandidateDocument { bytes, format });
            }
            Some("job_description") => job_description = Some(field.text().await?),
            _ => {}
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("Missing 'resume' file field".to_string()))?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job description must not be empty".to_string()))?;

    Ok(ResumeUpload {
        document,
        job_description,
    })
}
