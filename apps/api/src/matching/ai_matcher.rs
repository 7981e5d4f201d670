#![allow(dead_code)]

//! AI-Assisted Matcher: asks the LLM for a match assessment and turns
//! whatever comes back into a `MatchResult`.
//!
//! The caller never sees an error. A failed call or an unusable answer is
//! replaced by the neutral result (`predict_match`) or by the rule-based
//! scorer (`AiAssistedScorer` with `FallbackMode::RuleBased`).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCORE_SCALE_INSTRUCTION};
use crate::llm_client::{LlmError, TextCompletion};
use crate::matching::education::{highest_education_level, EducationLevel};
use crate::matching::experience::{estimate_total_experience_at, today};
use crate::matching::prompts::{
    CANDIDATE_PROFILE_SECTION, CANDIDATE_RESUME_SECTION, MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM,
    UNABLE_TO_ANALYZE_SUMMARY,
};
use crate::matching::response_repair::{repair_response, RepairError, RepairStage};
use crate::matching::scorer::{
    FallbackMode, MatchScorer, RuleBasedScorer, CULTURAL_FIT_PLACEHOLDER_SCORE,
};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRequirement;
use crate::models::match_result::{MatchAnalysis, MatchResult, ScorerBackend};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"));

/// Applied to any score the AI omitted or returned in an unusable form.
pub const DEFAULT_AI_SCORE: f64 = 50.0;

const OVERALL_KEYS: &[&str] = &["overall_match", "overallMatch", "overall_score", "overallScore", "match_score"];
const SKILLS_KEYS: &[&str] = &["skills_match", "skillsMatch", "skills_score", "skillsScore"];
const EXPERIENCE_KEYS: &[&str] = &["experience_match", "experienceMatch", "experience_score", "experienceScore"];
const EDUCATION_KEYS: &[&str] = &["education_match", "educationMatch", "education_score", "educationScore"];
const MATCHED_KEYS: &[&str] = &["matched_skills", "matchedSkills"];

#[derive(Debug, Error)]
pub enum AiMatchError {
    #[error("AI call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("AI response could not be parsed: {source}")]
    Unparseable { source: RepairError, raw: String },
}

impl AiMatchError {
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AiMatchError::Llm(_) => None,
            AiMatchError::Unparseable { raw, .. } => Some(raw.as_str()),
        }
    }
}

/// Candidate data as presented to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFeatures {
    pub skills: Vec<String>,
    /// Same one-decimal rounding as the rule-based scorer.
    pub total_years: f64,
    pub experience_lines: Vec<String>,
    pub highest_education: EducationLevel,
    pub resume_text: Option<String>,
}

impl CandidateFeatures {
    pub fn from_profile(profile: &CandidateProfile, today: NaiveDate) -> Self {
        let experience_lines = profile
            .experience
            .iter()
            .map(|e| {
                let start = e
                    .start_date
                    .map(|d| d.format("%Y-%m").to_string())
                    .unwrap_or_else(|| "?".to_string());
                let end = if e.current {
                    "present".to_string()
                } else {
                    e.end_date
                        .map(|d| d.format("%Y-%m").to_string())
                        .unwrap_or_else(|| "?".to_string())
                };
                format!(
                    "- {} at {} ({} to {}): {}",
                    e.position.trim(),
                    e.company.trim(),
                    start,
                    end,
                    e.description.trim()
                )
            })
            .collect();

        Self {
            skills: profile.skills.clone(),
            total_years: estimate_total_experience_at(&profile.experience, today),
            experience_lines,
            highest_education: highest_education_level(&profile.education),
            resume_text: profile
                .resume_text
                .as_ref()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

/// Job data as presented to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct JobFeatures {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub experience_required: f64,
}

impl From<&JobRequirement> for JobFeatures {
    fn from(job: &JobRequirement) -> Self {
        Self {
            title: job.title.clone(),
            description: job.description.clone(),
            required_skills: job.required_skills.clone(),
            experience_required: job.experience_required,
        }
    }
}

pub fn build_match_prompt(candidate: &CandidateFeatures, job: &JobFeatures) -> String {
    let skills = join_or(&candidate.skills, "none listed");

    let candidate_section = match &candidate.resume_text {
        Some(resume_text) => fill_template(
            CANDIDATE_RESUME_SECTION,
            &[("skills", skills.as_str()), ("resume_text", resume_text.as_str())],
        ),
        None => fill_template(
            CANDIDATE_PROFILE_SECTION,
            &[
                ("skills", skills.as_str()),
                ("total_years", candidate.total_years.to_string().as_str()),
                ("experience_lines", join_lines_or(&candidate.experience_lines, "- none listed").as_str()),
                ("education", non_empty_or(candidate.highest_education.label(), "not stated")),
            ],
        ),
    };

    fill_template(
        MATCH_PROMPT_TEMPLATE,
        &[
            ("score_scale", SCORE_SCALE_INSTRUCTION),
            ("job_title", non_empty_or(job.title.trim(), "untitled")),
            ("required_experience", job.experience_required.to_string().as_str()),
            ("required_skills", join_or(&job.required_skills, "none").as_str()),
            ("job_description", non_empty_or(job.description.trim(), "not provided")),
            ("candidate_section", candidate_section.as_str()),
        ],
    )
}

/// Substitutes `{name}` placeholders in a single pass over `template`.
/// Inserted values are never scanned, so user text containing a placeholder
/// stays literal. Unknown placeholders are left untouched.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn join_lines_or(lines: &[String], empty: &str) -> String {
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// AI match with the neutral result substituted on any failure.
pub async fn predict_match(
    completion: &dyn TextCompletion,
    candidate: &CandidateFeatures,
    job: &JobFeatures,
) -> MatchResult {
    match try_predict_match(completion, candidate, job).await {
        Ok(result) => result,
        Err(e) => {
            warn!("AI match failed, returning neutral result: {e}");
            neutral_match_result(e.raw_response().map(str::to_string))
        }
    }
}

/// AI match that reports failures instead of absorbing them.
pub async fn try_predict_match(
    completion: &dyn TextCompletion,
    candidate: &CandidateFeatures,
    job: &JobFeatures,
) -> Result<MatchResult, AiMatchError> {
    let prompt = build_match_prompt(candidate, job);
    let system = format!("{MATCH_SYSTEM} {JSON_ONLY_SYSTEM}");

    let raw = completion.complete(&prompt, &system).await?;

    let repaired = match repair_response(&raw) {
        Ok(repaired) => repaired,
        Err(source) => return Err(AiMatchError::Unparseable { source, raw }),
    };
    if repaired.stage != RepairStage::Direct {
        info!("AI match response recovered via {:?}", repaired.stage);
    }

    Ok(match_result_from_object(&repaired.object, &job.required_skills))
}

/// The 50/50/50/50 result used when nothing usable came back.
pub fn neutral_match_result(raw_response: Option<String>) -> MatchResult {
    MatchResult {
        overall_score: DEFAULT_AI_SCORE,
        skills_score: DEFAULT_AI_SCORE,
        experience_score: DEFAULT_AI_SCORE,
        education_score: DEFAULT_AI_SCORE,
        cultural_fit_score: CULTURAL_FIT_PLACEHOLDER_SCORE,
        matched_skills: Vec::new(),
        missing_skills: Vec::new(),
        analysis: MatchAnalysis {
            backend: ScorerBackend::AiNeutralDefault,
            summary: Some(UNABLE_TO_ANALYZE_SUMMARY.to_string()),
            raw_response,
            ..Default::default()
        },
    }
}

/// Maps a repaired AI object onto `MatchResult`, defaulting absent or
/// malformed scores to `DEFAULT_AI_SCORE` and clamping the rest to 0–100.
pub fn match_result_from_object(object: &Map<String, Value>, required_skills: &[String]) -> MatchResult {
    let (matched_skills, missing_skills) =
        partition_required(required_skills, &string_list(object, MATCHED_KEYS));

    MatchResult {
        overall_score: score_field(object, OVERALL_KEYS),
        skills_score: score_field(object, SKILLS_KEYS),
        experience_score: score_field(object, EXPERIENCE_KEYS),
        education_score: score_field(object, EDUCATION_KEYS),
        cultural_fit_score: CULTURAL_FIT_PLACEHOLDER_SCORE,
        matched_skills,
        missing_skills,
        analysis: MatchAnalysis {
            backend: ScorerBackend::Ai,
            strengths: string_list(object, &["strengths"]),
            gaps: string_list(object, &["gaps"]),
            summary: object
                .get("summary")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            ..Default::default()
        },
    }
}

/// Splits the job's required skills by what the AI reported as matched.
/// Anything it did not list as matched is missing, and skills the job never
/// asked for are dropped.
fn partition_required(required_skills: &[String], ai_matched: &[String]) -> (Vec<String>, Vec<String>) {
    let ai_matched: HashSet<String> = ai_matched.iter().map(|s| s.to_lowercase()).collect();
    required_skills
        .iter()
        .cloned()
        .partition(|skill| ai_matched.contains(&skill.trim().to_lowercase()))
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| object.get(*k))
}

fn score_field(object: &Map<String, Value>, keys: &[&str]) -> f64 {
    let score = first_present(object, keys).and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    });

    match score {
        Some(s) if s.is_finite() => s.clamp(0.0, 100.0),
        _ => DEFAULT_AI_SCORE,
    }
}

/// Accepts a JSON array or a comma-separated string. Blank and repeated
/// (case-insensitive) entries are dropped.
fn string_list(object: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let items: Vec<String> = match first_present(object, keys) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

/// `MatchScorer` backed by the LLM, with a configurable fallback.
pub struct AiAssistedScorer {
    completion: Arc<dyn TextCompletion>,
    fallback: FallbackMode,
    rule_based: RuleBasedScorer,
}

impl AiAssistedScorer {
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        fallback: FallbackMode,
        rule_based: RuleBasedScorer,
    ) -> Self {
        Self {
            completion,
            fallback,
            rule_based,
        }
    }
}

#[async_trait]
impl MatchScorer for AiAssistedScorer {
    async fn score(&self, candidate: &CandidateProfile, job: &JobRequirement) -> MatchResult {
        let features = CandidateFeatures::from_profile(candidate, today());
        let job_features = JobFeatures::from(job);

        match try_predict_match(self.completion.as_ref(), &features, &job_features).await {
            Ok(mut result) => {
                debug!("AI match score: {}", result.overall_score);
                result.analysis.total_years = Some(features.total_years);
                result.analysis.required_years = Some(job.experience_required);
                let level = features.highest_education.label();
                if !level.is_empty() {
                    result.analysis.highest_education = Some(level.to_string());
                }
                result
            }
            Err(e) => {
                let raw_response = e.raw_response().map(str::to_string);
                match self.fallback {
                    FallbackMode::RuleBased => {
                        warn!("AI match failed, falling back to rule-based scoring: {e}");
                        let mut result = self.rule_based.score(candidate, job).await;
                        result.analysis.backend = ScorerBackend::AiRuleBasedFallback;
                        result.analysis.raw_response = raw_response;
                        result
                    }
                    FallbackMode::Neutral => {
                        warn!("AI match failed, returning neutral result: {e}");
                        neutral_match_result(raw_response)
                    }
                }
            }
        }
    }
}
