use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::fields::ContactInfo;
use crate::evaluation::fusion::CompositeScore;
use crate::evaluation::reputation::ReputationSummary;
use crate::evaluation::resume::ResumeAnalysis;

/// Store key for a candidate name: spaces become underscores.
pub fn candidate_doc_id(candidate_name: &str) -> String {
    candidate_name.replace(' ', "_")
}

/// Everything one evaluation run learned about a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_name: String,
    pub contact: ContactInfo,
    pub resume_analysis: ResumeAnalysis,
    /// Absent when no GitHub username was found.
    pub github_analysis: Option<ReputationSummary>,
    pub combined_score: CompositeScore,
    pub run_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
}

/// The per-candidate body of the caller-facing result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub resume_analysis: ResumeAnalysis,
    pub github_analysis: Option<ReputationSummary>,
    pub combined_score: CompositeScore,
}

/// `{ "<candidate name>": { resume_analysis, github_analysis, combined_score } }`
pub type EvaluationResponse = BTreeMap<String, CandidateEvaluation>;

impl CandidateRecord {
    pub fn doc_id(&self) -> String {
        candidate_doc_id(&self.candidate_name)
    }

    pub fn to_response(&self) -> EvaluationResponse {
        BTreeMap::from([(
            self.candidate_name.clone(),
            CandidateEvaluation {
                resume_analysis: self.resume_analysis.clone(),
                github_analysis: self.github_analysis.clone(),
                combined_score: self.combined_score,
            },
        )])
    }
}
