// Shared prompt fragments.
// Each evaluator defines its own prompt templates in evaluation/prompts.rs.

/// System prompt that asks for JSON-only output. Replies are still scanned for
/// embedded JSON because no provider enforces it.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every evaluation prompt.
pub const OBJECTIVITY_INSTRUCTION: &str =
    "Be objective and focus on factual matches between the candidate and the job requirements.";
