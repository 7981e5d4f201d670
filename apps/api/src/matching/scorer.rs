//! Match Scoring: pluggable, trait-based scorer that measures a candidate
//! against a job.
//!
//! Default: `RuleBasedScorer` (local, deterministic, always succeeds).
//! Optional: `AiAssistedScorer` in `ai_matcher`, which falls back to this one.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, swapped at startup via config.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::matching::education::highest_education_level;
use crate::matching::experience::{
    calculate_experience_recency_at, estimate_total_experience_at, today,
};
use crate::matching::key_phrases::{KeyPhraseError, KeyPhraseExtractor};
use crate::matching::similarity::best_similarity;
use crate::matching::skills::{match_skills, SEMANTIC_MATCH_THRESHOLD};
use crate::models::candidate::{CandidateProfile, ExperienceEntry};
use crate::models::job::JobRequirement;
use crate::models::match_result::{MatchAnalysis, MatchResult, ScorerBackend};

// Overall weights: skills > experience > education > cultural fit.
pub const SKILLS_WEIGHT: f64 = 0.4;
pub const EXPERIENCE_WEIGHT: f64 = 0.3;
pub const EDUCATION_WEIGHT: f64 = 0.2;
pub const CULTURAL_FIT_WEIGHT: f64 = 0.1;

// Experience sub-score weights.
const YEARS_WEIGHT: f64 = 0.6;
const RELEVANCE_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.1;

pub const DEFAULT_RELEVANCE_SCORE: f64 = 50.0;
pub const EDUCATION_BASELINE_SCORE: f64 = 30.0;
pub const EDUCATION_PRESENT_SCORE: f64 = 100.0;
pub const CULTURAL_FIT_PLACEHOLDER_SCORE: f64 = 75.0;

/// The scorer trait. Implement this to swap backends without touching the
/// handlers or the batch matcher.
///
/// Carried in `AppState` as `Arc<dyn MatchScorer>`.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    /// Always produces a result; backends absorb their own failures.
    async fn score(&self, candidate: &CandidateProfile, job: &JobRequirement) -> MatchResult;
}

/// What the AI-assisted scorer substitutes when the AI call cannot be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    #[default]
    RuleBased,
    Neutral,
}

#[derive(Debug, Error)]
#[error("unknown fallback mode '{0}'")]
pub struct UnknownFallbackMode(String);

impl FromStr for FallbackMode {
    type Err = UnknownFallbackMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule_based" | "rule-based" | "rules" => Ok(FallbackMode::RuleBased),
            "neutral" => Ok(FallbackMode::Neutral),
            other => Err(UnknownFallbackMode(other.to_string())),
        }
    }
}

/// Local multi-factor scorer. The key-phrase collaborator only refines
/// semantic skill matching and experience relevance.
pub struct RuleBasedScorer {
    key_phrases: Arc<dyn KeyPhraseExtractor>,
}

impl RuleBasedScorer {
    pub fn new(key_phrases: Arc<dyn KeyPhraseExtractor>) -> Self {
        Self { key_phrases }
    }
}

#[async_trait]
impl MatchScorer for RuleBasedScorer {
    async fn score(&self, candidate: &CandidateProfile, job: &JobRequirement) -> MatchResult {
        calculate_match_score(candidate, job, self.key_phrases.as_ref()).await
    }
}

pub fn weighted_overall(skills: f64, experience: f64, education: f64, cultural_fit: f64) -> f64 {
    skills * SKILLS_WEIGHT
        + experience * EXPERIENCE_WEIGHT
        + education * EDUCATION_WEIGHT
        + cultural_fit * CULTURAL_FIT_WEIGHT
}

pub async fn calculate_match_score(
    candidate: &CandidateProfile,
    job: &JobRequirement,
    key_phrases: &dyn KeyPhraseExtractor,
) -> MatchResult {
    calculate_match_score_at(candidate, job, key_phrases, today()).await
}

/// Composite score evaluated as of `today`.
pub async fn calculate_match_score_at(
    candidate: &CandidateProfile,
    job: &JobRequirement,
    key_phrases: &dyn KeyPhraseExtractor,
    today: NaiveDate,
) -> MatchResult {
    let (skills, experience) = tokio::join!(
        match_skills(&candidate.skills, &job.required_skills, key_phrases),
        score_experience(&candidate.experience, job, key_phrases, today),
    );

    let education_score = if candidate.education.is_empty() {
        EDUCATION_BASELINE_SCORE
    } else {
        EDUCATION_PRESENT_SCORE
    };
    let highest_education = highest_education_level(&candidate.education);
    let cultural_fit_score = CULTURAL_FIT_PLACEHOLDER_SCORE;

    MatchResult {
        overall_score: weighted_overall(
            skills.score,
            experience.score,
            education_score,
            cultural_fit_score,
        ),
        skills_score: skills.score,
        experience_score: experience.score,
        education_score,
        cultural_fit_score,
        matched_skills: skills.matched_skills,
        missing_skills: skills.missing_skills,
        analysis: MatchAnalysis {
            backend: ScorerBackend::RuleBased,
            total_years: experience.total_years,
            required_years: Some(job.experience_required),
            relevance: experience.relevance,
            recency: experience.recency,
            highest_education: Some(highest_education.label().to_string())
                .filter(|l| !l.is_empty()),
            semantic_matches: skills.semantic_matches,
            ..Default::default()
        },
    }
}

#[derive(Debug, Default)]
struct ExperienceScore {
    score: f64,
    total_years: Option<f64>,
    relevance: Option<f64>,
    recency: Option<f64>,
}

async fn score_experience(
    entries: &[ExperienceEntry],
    job: &JobRequirement,
    key_phrases: &dyn KeyPhraseExtractor,
    today: NaiveDate,
) -> ExperienceScore {
    let required = job.experience_required.max(0.0);
    let total_years = estimate_total_experience_at(entries, today);

    if required == 0.0 {
        return ExperienceScore {
            score: 100.0,
            total_years: Some(total_years),
            ..Default::default()
        };
    }
    if entries.is_empty() {
        return ExperienceScore {
            score: 0.0,
            total_years: Some(0.0),
            ..Default::default()
        };
    }

    let years_score = if total_years >= required {
        100.0
    } else {
        total_years / required * 100.0
    };
    let relevance = experience_relevance(entries, job, key_phrases).await;
    let recency = calculate_experience_recency_at(entries, today);

    ExperienceScore {
        score: years_score * YEARS_WEIGHT + relevance * RELEVANCE_WEIGHT + recency * RECENCY_WEIGHT,
        total_years: Some(total_years),
        relevance: Some(relevance),
        recency: Some(recency),
    }
}

/// Share (0–100) of the job's key phrases echoed by the candidate's
/// experience text. `DEFAULT_RELEVANCE_SCORE` when the collaborator is
/// unavailable, errors, or finds nothing in the job text.
pub async fn experience_relevance(
    entries: &[ExperienceEntry],
    job: &JobRequirement,
    key_phrases: &dyn KeyPhraseExtractor,
) -> f64 {
    let job_text = format!("{}. {}", job.title.trim(), job.description.trim());
    let experience_text = entries
        .iter()
        .map(|e| format!("{} {}", e.position.trim(), e.description.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    if job.description.trim().is_empty() && job.title.trim().is_empty() {
        return DEFAULT_RELEVANCE_SCORE;
    }
    if experience_text.trim().is_empty() {
        return DEFAULT_RELEVANCE_SCORE;
    }

    let (job_phrases, experience_phrases) = tokio::join!(
        key_phrases.extract_key_phrases(&job_text),
        key_phrases.extract_key_phrases(&experience_text),
    );

    let (job_phrases, experience_phrases) = match (job_phrases, experience_phrases) {
        (Ok(j), Ok(e)) => (normalize_phrases(j), normalize_phrases(e)),
        (Err(KeyPhraseError::Unavailable), _) | (_, Err(KeyPhraseError::Unavailable)) => {
            return DEFAULT_RELEVANCE_SCORE
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("Key-phrase extraction failed, using default relevance: {e}");
            return DEFAULT_RELEVANCE_SCORE;
        }
    };

    if job_phrases.is_empty() {
        return DEFAULT_RELEVANCE_SCORE;
    }

    let matched = job_phrases
        .iter()
        .filter(|jp| phrase_covered(jp, &experience_phrases))
        .count();

    matched as f64 / job_phrases.len() as f64 * 100.0
}

fn normalize_phrases(phrases: Vec<String>) -> Vec<String> {
    phrases
        .into_iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn phrase_covered(job_phrase: &str, experience_phrases: &[String]) -> bool {
    experience_phrases
        .iter()
        .any(|ep| ep.contains(job_phrase) || job_phrase.contains(ep.as_str()))
        || best_similarity(job_phrase, experience_phrases.iter().map(String::as_str))
            > SEMANTIC_MATCH_THRESHOLD
}
