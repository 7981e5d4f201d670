// Cross-cutting prompt fragments shared by every LLM caller.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminds the model that scores are integers on a fixed scale.
pub const SCORE_SCALE_INSTRUCTION: &str = "\
    All scores are integers from 0 to 100, where 0 means no fit at all and 100 means \
    a complete fit. Never return scores outside this range.";
