//! Résumé evaluation: asks the generative backend for a structured judgment of
//! the résumé against the job description.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::evaluation::prompts::{resume_evaluation_prompt, EVALUATION_SYSTEM};
use crate::llm_client::{generate_with_timeout, json::object_candidates, LlmError, TextGenerator};

pub const PARSE_FAILURE_ASSESSMENT: &str = "Failed to parse response";

/// The backend could not be reached during résumé evaluation. Fatal to the run.
#[derive(Debug, Error)]
#[error("resume evaluation backend failed: {0}")]
pub struct EvaluationBackendError(#[from] pub LlmError);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum Relevance {
    #[default]
    Low,
    Medium,
    High,
}

impl From<Value> for Relevance {
    /// Models answer with free text ("High", "medium relevance"); anything
    /// unrecognised, `null` included, counts as low.
    fn from(value: Value) -> Self {
        let value = value.as_str().unwrap_or_default().to_ascii_lowercase();
        if value.contains("high") {
            Relevance::High
        } else if value.contains("medium") {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsMatch {
    #[serde(deserialize_with = "lenient_strings")]
    pub matched_skills: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEvaluation {
    #[serde(deserialize_with = "lenient_years")]
    pub years_experience: f32,
    pub relevance: Relevance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEvaluation {
    #[serde(deserialize_with = "lenient_bool")]
    pub degree_match: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub education_level: String,
}

/// Accepts `4`, `4.5`, `"5+ years"`; anything else is zero.
fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default().max(0.0) as f32,
        Value::String(text) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse::<f32>().unwrap_or(0.0)
        }
        _ => 0.0,
    })
}

/// `true`, `"yes"`, `"True"`, `1`; anything else is false.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A list of scalars, a lone string, or `null`. Nested values are dropped.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        Value::String(text) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}

/// A nested section that is `null` or malformed takes its empty value.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Structured résumé judgment. Every field is always present; keys the model
/// leaves out take their empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeAnalysis {
    #[serde(deserialize_with = "lenient_section")]
    pub skills_match: SkillsMatch,
    #[serde(deserialize_with = "lenient_section")]
    pub experience_evaluation: ExperienceEvaluation,
    #[serde(deserialize_with = "lenient_section")]
    pub education_evaluation: EducationEvaluation,
    #[serde(deserialize_with = "lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub overall_assessment: String,
}

/// Top-level keys of [`ResumeAnalysis`]. A reply object carrying none of them
/// is not an analysis, however cleanly it decodes.
const ANALYSIS_KEYS: &[&str] = &[
    "skills_match",
    "experience_evaluation",
    "education_evaluation",
    "strengths",
    "weaknesses",
    "overall_assessment",
];

impl ResumeAnalysis {
    /// Zeroed analysis used when the model reply holds no decodable JSON.
    pub fn unparsed() -> Self {
        Self {
            overall_assessment: PARSE_FAILURE_ASSESSMENT.to_string(),
            ..Self::default()
        }
    }
}

/// Evaluates `resume_text` (already normalized) against `job_description`.
///
/// An unparseable reply is recovered with [`ResumeAnalysis::unparsed`]. A failed
/// call is returned as [`EvaluationBackendError`]: without a reply there is no
/// partial signal to fall back on.
pub async fn evaluate_resume(
    llm: &dyn TextGenerator,
    job_description: &str,
    resume_text: &str,
    timeout: Duration,
) -> Result<ResumeAnalysis, EvaluationBackendError> {
    info!("Sending resume to {} for analysis", llm.model());
    let prompt = resume_evaluation_prompt(job_description, resume_text);
    let reply = generate_with_timeout(llm, &prompt, EVALUATION_SYSTEM, timeout).await?;

    match decode_analysis(&reply) {
        Some(analysis) => {
            info!("Resume analysis completed");
            Ok(analysis)
        }
        None => {
            warn!("Resume analysis reply held no decodable JSON; using empty analysis");
            Ok(ResumeAnalysis::unparsed())
        }
    }
}

/// First embedded object that names at least one analysis key.
fn decode_analysis(reply: &str) -> Option<ResumeAnalysis> {
    object_candidates(reply).find_map(|candidate| {
        let object: Map<String, Value> = serde_json::from_str(candidate).ok()?;
        if !ANALYSIS_KEYS.iter().any(|key| object.contains_key(*key)) {
            return None;
        }
        serde_json::from_value(Value::Object(object)).ok()
    })
}
