// All LLM prompt templates for the evaluation pipeline.
// Placeholders are filled in a single pass over the template, so inserted text
// that quotes a placeholder name is never expanded.

/// System prompt for both evaluation calls.
pub use crate::llm_client::prompts::JSON_ONLY_SYSTEM as EVALUATION_SYSTEM;
use crate::llm_client::prompts::OBJECTIVITY_INSTRUCTION;

/// Résumé evaluation prompt. Replace `{job_description}` and `{resume_text}`.
pub const RESUME_EVALUATION_PROMPT: &str = r#"Analyze this resume against the given job description and provide a comprehensive evaluation.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Return a JSON object with this EXACT structure:
{
  "skills_match": {
    "matched_skills": ["skill present in both"],
    "missing_skills": ["skill required but absent"]
  },
  "experience_evaluation": {
    "years_experience": 0,
    "relevance": "low" | "medium" | "high"
  },
  "education_evaluation": {
    "degree_match": true | false,
    "education_level": "High School" | "Bachelor's" | "Master's" | "PhD" | "Other"
  },
  "strengths": ["string"],
  "weaknesses": ["string"],
  "overall_assessment": "text summary"
}

{objectivity}"#;

/// Score fusion prompt. Replace `{job_description}`, `{resume_text}` and `{reputation_digest}`.
pub const SCORE_FUSION_PROMPT: &str = r#"Analyze the following candidate for suitability for the job. Consider both the resume and the GitHub profile data.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

GITHUB PROFILE DATA:
{reputation_digest}

Return a JSON object with exactly these integer fields, each between 0 and 100:
{
  "suitability_score": 0,
  "reputation_score": 0,
  "resume_score": 0
}

{objectivity}"#;

pub fn resume_evaluation_prompt(job_description: &str, resume_text: &str) -> String {
    fill_template(
        RESUME_EVALUATION_PROMPT,
        &[
            ("objectivity", OBJECTIVITY_INSTRUCTION),
            ("job_description", job_description),
            ("resume_text", resume_text),
        ],
    )
}

pub fn score_fusion_prompt(job_description: &str, resume_text: &str, reputation_digest: &str) -> String {
    fill_template(
        SCORE_FUSION_PROMPT,
        &[
            ("objectivity", OBJECTIVITY_INSTRUCTION),
            ("job_description", job_description),
            ("resume_text", resume_text),
            ("reputation_digest", reputation_digest),
        ],
    )
}

/// Replaces each `{key}` in `template` with its value. Braces that do not
/// name a key (the JSON shapes in the templates) are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        filled.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = values.iter().find(|(key, _)| {
            after
                .strip_prefix(*key)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                filled.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                filled.push('{');
                rest = after;
            }
        }
    }
    filled.push_str(rest);
    filled
}
