//! Axum route handlers for the Matching API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::batch::{batch_match, CandidateRecord, MatchFilters, RankedMatch};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRequirement;
use crate::models::match_result::MatchResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub candidate: CandidateProfile,
    pub job: JobRequirement,
}

#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub job: JobRequirement,
    pub candidates: Vec<CandidateRecord>,
    #[serde(default)]
    pub filters: MatchFilters,
}

#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub total_candidates: usize,
    pub returned: usize,
    pub matches: Vec<RankedMatch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match
///
/// Scores one candidate against one job with the configured default backend.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    request.job.validate()?;

    let result = state.match_scorer.score(&request.candidate, &request.job).await;
    info!(
        "Match scored {:.1} via {:?}",
        result.overall_score, result.analysis.backend
    );

    Ok(Json(result))
}

/// POST /api/v1/match/rule-based
///
/// Always uses the local composite scorer, regardless of configuration.
pub async fn handle_rule_based_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    request.job.validate()?;

    let result = state.rule_based.score(&request.candidate, &request.job).await;

    Ok(Json(result))
}

/// POST /api/v1/match/ai
///
/// Always uses the AI-assisted scorer. Rejected when no AI client is configured.
pub async fn handle_ai_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    request.job.validate()?;

    let scorer = state.ai_scorer.as_ref().ok_or_else(|| {
        AppError::UnprocessableEntity("AI matching is not configured on this server".to_string())
    })?;

    let result = scorer.score(&request.candidate, &request.job).await;

    Ok(Json(result))
}

/// POST /api/v1/match/batch
///
/// Scores every candidate against one job in parallel, then filters and ranks.
pub async fn handle_batch_match(
    State(state): State<AppState>,
    Json(request): Json<BatchMatchRequest>,
) -> Result<Json<BatchMatchResponse>, AppError> {
    request.job.validate()?;
    request.filters.validate()?;

    let total_candidates = request.candidates.len();
    if total_candidates > state.config.batch_max_candidates {
        return Err(AppError::Validation(format!(
            "batch of {total_candidates} candidates exceeds the limit of {}",
            state.config.batch_max_candidates
        )));
    }

    let matches = batch_match(
        Arc::clone(&state.match_scorer),
        Arc::new(request.job),
        request.candidates,
        &request.filters,
    )
    .await?;

    Ok(Json(BatchMatchResponse {
        total_candidates,
        returned: matches.len(),
        matches,
    }))
}
