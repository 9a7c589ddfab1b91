//! Score fusion: one backend call that weighs the résumé and the reputation
//! digest together into three bounded scores.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::evaluation::prompts::{score_fusion_prompt, EVALUATION_SYSTEM};
use crate::llm_client::{generate_with_timeout, json::decode_embedded, TextGenerator};

/// Three scores in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCompositeScore")]
pub struct CompositeScore {
    pub suitability_score: u8,
    pub reputation_score: u8,
    pub resume_score: u8,
}

/// Wire shape accepted from the model: numbers or numeric strings, with
/// missing keys and `null` as zero.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCompositeScore {
    #[serde(deserialize_with = "lenient_score")]
    suitability_score: f64,
    #[serde(alias = "github_score", deserialize_with = "lenient_score")]
    reputation_score: f64,
    #[serde(deserialize_with = "lenient_score")]
    resume_score: f64,
}

/// `85`, `"85"`, `"85/100"`, `"72.5%"`; anything else is zero.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(text) => {
            let text = text.trim();
            let end = text
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
                .map_or(text.len(), |(i, _)| i);
            text[..end].parse::<f64>().unwrap_or_default()
        }
        _ => 0.0,
    })
}

impl From<RawCompositeScore> for CompositeScore {
    fn from(raw: RawCompositeScore) -> Self {
        Self {
            suitability_score: clamp_score(raw.suitability_score),
            reputation_score: clamp_score(raw.reputation_score),
            resume_score: clamp_score(raw.resume_score),
        }
    }
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Fuses résumé text and `reputation_digest` into a [`CompositeScore`].
///
/// Never fails: an unparseable reply and a failed call both produce all-zero
/// scores. This differs from résumé evaluation, where a failed call aborts
/// the run; by this stage the analysis is complete and worth keeping.
pub async fn fuse_scores(
    llm: &dyn TextGenerator,
    job_description: &str,
    resume_text: &str,
    reputation_digest: &str,
    timeout: Duration,
) -> CompositeScore {
    let prompt = score_fusion_prompt(job_description, resume_text, reputation_digest);
    let reply = match generate_with_timeout(llm, &prompt, EVALUATION_SYSTEM, timeout).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("Score fusion call failed, scoring zero: {err}");
            return CompositeScore::default();
        }
    };

    match decode_embedded::<CompositeScore>(&reply) {
        Some(score) => {
            info!(
                suitability = score.suitability_score,
                reputation = score.reputation_score,
                resume = score.resume_score,
                "Scores fused"
            );
            score
        }
        None => {
            warn!("Score fusion reply held no decodable JSON; scoring zero");
            CompositeScore::default()
        }
    }
}
