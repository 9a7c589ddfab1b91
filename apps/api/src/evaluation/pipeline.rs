//! Runs one candidate evaluation end to end.
//!
//! Stages advance strictly forward:
//! Received → Extracted → Normalized → FieldsParsed → ResumeScored →
//! ReputationResolved (only when a username was found) → Fused → Persisted.
//! Résumé evaluation and the reputation scan share no data and run
//! concurrently; fusion waits for both.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::candidates::store::{CandidateStore, StoreError};
use crate::evaluation::document::{extract_document, CandidateDocument, DocumentExtractor, DocumentReadError};
use crate::evaluation::fields::extract_contact_info;
use crate::evaluation::fusion::fuse_scores;
use crate::evaluation::normalize::normalize_text;
use crate::evaluation::reputation::{assess_reputation, reputation_digest};
use crate::evaluation::resume::{evaluate_resume, EvaluationBackendError};
use crate::github_client::CodeHost;
use crate::llm_client::TextGenerator;
use crate::models::candidate::CandidateRecord;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    DocumentRead(#[from] DocumentReadError),

    #[error(transparent)]
    EvaluationBackend(#[from] EvaluationBackendError),

    #[error("candidate record could not be stored: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Extracted,
    Normalized,
    FieldsParsed,
    ResumeScored,
    ReputationResolved,
    Fused,
    Persisted,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Bound on each generative call.
    pub llm_timeout: Duration,
    pub max_repositories: usize,
}

/// Collaborators are built once in `main` and shared across requests.
pub struct EvaluationPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    llm: Arc<dyn TextGenerator>,
    code_host: Arc<dyn CodeHost>,
    store: Arc<dyn CandidateStore>,
    settings: PipelineSettings,
}

impl EvaluationPipeline {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        llm: Arc<dyn TextGenerator>,
        code_host: Arc<dyn CodeHost>,
        store: Arc<dyn CandidateStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            llm,
            code_host,
            store,
            settings,
        }
    }

    /// Evaluates `document` against `job_description` and persists the record.
    pub async fn evaluate(
        &self,
        document: CandidateDocument,
        job_description: &str,
    ) -> Result<CandidateRecord, PipelineError> {
        let run_id = Uuid::new_v4();
        self.run(run_id, document, job_description)
            .instrument(info_span!("evaluation", %run_id))
            .await
    }

    async fn run(
        &self,
        run_id: Uuid,
        document: CandidateDocument,
        job_description: &str,
    ) -> Result<CandidateRecord, PipelineError> {
        advance(PipelineStage::Received);

        let text = extract_document(Arc::clone(&self.extractor), document).await?;
        advance(PipelineStage::Extracted);

        let resume_text = normalize_text(text.as_str());
        advance(PipelineStage::Normalized);

        // Fields need the raw line structure; normalization flattens it.
        let contact = extract_contact_info(text.as_str());
        info!(
            candidate = %contact.name,
            has_github = contact.github_username.is_some(),
            "Contact fields parsed"
        );
        advance(PipelineStage::FieldsParsed);

        let resume = evaluate_resume(
            self.llm.as_ref(),
            job_description,
            &resume_text,
            self.settings.llm_timeout,
        );
        let reputation = async {
            let summary = match contact.github_username.as_deref() {
                Some(username) => Some(
                    assess_reputation(
                        self.code_host.as_ref(),
                        username,
                        job_description,
                        self.settings.max_repositories,
                    )
                    .await,
                ),
                None => {
                    info!("No GitHub username found, skipping reputation scan");
                    None
                }
            };
            Ok::<_, EvaluationBackendError>(summary)
        };
        // A failed résumé call abandons the scan still in flight.
        let (resume_analysis, github_analysis) = tokio::try_join!(resume, reputation)?;
        advance(PipelineStage::ResumeScored);
        if github_analysis.is_some() {
            advance(PipelineStage::ReputationResolved);
        }

        let digest = reputation_digest(github_analysis.as_ref());
        let combined_score = fuse_scores(
            self.llm.as_ref(),
            job_description,
            &resume_text,
            &digest,
            self.settings.llm_timeout,
        )
        .await;
        advance(PipelineStage::Fused);

        let record = CandidateRecord {
            candidate_name: contact.name.clone(),
            contact,
            resume_analysis,
            github_analysis,
            combined_score,
            run_id,
            evaluated_at: Utc::now(),
        };
        self.store.save(&record).await?;
        advance(PipelineStage::Persisted);

        Ok(record)
    }
}

fn advance(stage: PipelineStage) {
    info!(?stage, "Pipeline stage reached");
}
