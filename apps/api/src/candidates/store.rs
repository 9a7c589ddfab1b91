//! Candidate persistence. The pipeline writes through [`CandidateStore`];
//! PostgreSQL backs it in production.

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use thiserror::Error;
use tracing::info;

use crate::models::candidate::CandidateRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Candidate records keyed by [`CandidateRecord::doc_id`].
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Upserts the record (last write wins) and returns its key.
    async fn save(&self, record: &CandidateRecord) -> Result<String, StoreError>;

    async fn fetch(&self, doc_id: &str) -> Result<Option<CandidateRecord>, StoreError>;

    /// Returns `false` when nothing was stored under `doc_id`.
    async fn delete(&self, doc_id: &str) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgCandidateStore {
    db: PgPool,
}

impl PgCandidateStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn save(&self, record: &CandidateRecord) -> Result<String, StoreError> {
        let doc_id = record.doc_id();
        let body = serde_json::to_value(record)?;
        sqlx::query(
            r#"
            INSERT INTO candidates (doc_id, candidate_name, record, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (doc_id) DO UPDATE
            SET candidate_name = EXCLUDED.candidate_name,
                record = EXCLUDED.record,
                updated_at = now()
            "#,
        )
        .bind(&doc_id)
        .bind(&record.candidate_name)
        .bind(body)
        .execute(&self.db)
        .await?;

        info!("Saved candidate record {doc_id}");
        Ok(doc_id)
    }

    async fn fetch(&self, doc_id: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let record: Option<Json<CandidateRecord>> =
            sqlx::query_scalar("SELECT record FROM candidates WHERE doc_id = $1")
                .bind(doc_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(record.map(|Json(record)| record))
    }

    async fn delete(&self, doc_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM candidates WHERE doc_id = $1")
            .bind(doc_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
