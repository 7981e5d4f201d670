use serde::{Deserialize, Serialize};

/// Which scorer produced a `MatchResult`. Surfaced to callers for transparency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerBackend {
    #[default]
    RuleBased,
    Ai,
    /// The AI call failed and the neutral 50/50/50/50 result was substituted.
    AiNeutralDefault,
    /// The AI call failed and the rule-based scorer was run instead.
    AiRuleBasedFallback,
}

/// Diagnostic detail attached to a match. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub backend: ScorerBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_education: Option<String>,
    /// Required skills that were only matched through key-phrase similarity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub semantic_matches: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Raw AI output kept when it could not be parsed, for caller-side logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Outcome of matching one candidate against one job. All scores are 0–100.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResult {
    pub overall_score: f64,
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub cultural_fit_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub analysis: MatchAnalysis,
}
