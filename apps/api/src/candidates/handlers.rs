use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::candidate::{candidate_doc_id, CandidateRecord};
use crate::state::AppState;

/// GET /candidates/:candidate_name
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(candidate_name): Path<String>,
) -> Result<Json<CandidateRecord>, AppError> {
    let record = state
        .store
        .fetch(&candidate_doc_id(&candidate_name))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate '{candidate_name}' not found")))?;
    Ok(Json(record))
}

/// DELETE /candidates/:candidate_name
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(candidate_name): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete(&candidate_doc_id(&candidate_name)).await? {
        return Err(AppError::NotFound(format!(
            "Candidate '{candidate_name}' not found"
        )));
    }
    Ok(Json(json!({
        "message": format!("Candidate '{candidate_name}' deleted.")
    })))
}
