//! Batch matching: scores many candidates against one job in parallel, then
//! filters and ranks them.
//!
//! Filter semantics: every filter must pass (AND); score bounds are inclusive.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::scorer::MatchScorer;
use crate::matching::skills::{is_direct_match, normalize_skills};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRequirement;
use crate::models::match_result::MatchResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: Uuid,
    pub candidate: CandidateProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchFilters {
    /// Candidate must hold every one of these skills.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl MatchFilters {
    pub fn validate(&self) -> Result<(), AppError> {
        for bound in [self.min_score, self.max_score].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(AppError::Validation("score bounds must be finite numbers".to_string()));
            }
        }
        if let (Some(min), Some(max)) = (self.min_score, self.max_score) {
            if min > max {
                return Err(AppError::Validation(format!(
                    "min_score ({min}) must not exceed max_score ({max})"
                )));
            }
        }
        Ok(())
    }

    fn score_in_range(&self, score: f64) -> bool {
        self.min_score.map_or(true, |min| score >= min) && self.max_score.map_or(true, |max| score <= max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatch {
    /// 1-based position after sorting.
    pub rank: usize,
    pub candidate_id: Uuid,
    pub result: MatchResult,
}

/// True when the candidate holds every filter skill (exact or substring,
/// case-insensitive). An empty filter admits everyone.
pub fn has_required_skills(candidate: &CandidateProfile, filter_skills: &[String]) -> bool {
    let candidate_lower = normalize_skills(&candidate.skills);
    filter_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .all(|s| is_direct_match(&s, &candidate_lower))
}

/// Scores `candidates` concurrently and returns them ranked by
/// `overall_score`, highest first. Ties keep input order.
pub async fn batch_match(
    scorer: Arc<dyn MatchScorer>,
    job: Arc<JobRequirement>,
    candidates: Vec<CandidateRecord>,
    filters: &MatchFilters,
) -> Result<Vec<RankedMatch>, AppError> {
    let total = candidates.len();
    let mut tasks = JoinSet::new();

    for (index, record) in candidates.into_iter().enumerate() {
        if !has_required_skills(&record.candidate, &filters.skills) {
            continue;
        }
        let scorer = Arc::clone(&scorer);
        let job = Arc::clone(&job);
        tasks.spawn(async move {
            let result = scorer.score(&record.candidate, &job).await;
            (index, record.candidate_id, result)
        });
    }

    let mut scored = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        scored.push(joined.context("match task failed")?);
    }

    scored.retain(|(_, _, result)| filters.score_in_range(result.overall_score));
    scored.sort_by(|a, b| {
        b.2.overall_score
            .partial_cmp(&a.2.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    if let Some(limit) = filters.max_results {
        scored.truncate(limit);
    }

    info!("Batch match: {} of {} candidates returned", scored.len(), total);

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(position, (_, candidate_id, result))| RankedMatch {
            rank: position + 1,
            candidate_id,
            result,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    /// Scores each candidate at 10 points per listed skill.
    struct SkillCountScorer;

    #[async_trait]
    impl MatchScorer for SkillCountScorer {
        async fn score(&self, candidate: &CandidateProfile, _job: &JobRequirement) -> MatchResult {
            MatchResult {
                overall_score: candidate.skills.len() as f64 * 10.0,
                ..Default::default()
            }
        }
    }

    fn record(skills: &[&str]) -> CandidateRecord {
        CandidateRecord {
            candidate_id: Uuid::new_v4(),
            candidate: CandidateProfile {
                skills: skills.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    async fn run(candidates: Vec<CandidateRecord>, filters: MatchFilters) -> Vec<RankedMatch> {
        batch_match(
            Arc::new(SkillCountScorer),
            Arc::new(JobRequirement::default()),
            candidates,
            &filters,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_sorted_descending_with_ranks() {
        let candidates = vec![record(&["a"]), record(&["a", "b", "c"]), record(&["a", "b"])];
        let ids: Vec<Uuid> = candidates.iter().map(|c| c.candidate_id).collect();
        let ranked = run(candidates, MatchFilters::default()).await;
        let order: Vec<Uuid> = ranked.iter().map(|r| r.candidate_id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let candidates = vec![record(&["x"]), record(&["y"]), record(&["z"])];
        let ids: Vec<Uuid> = candidates.iter().map(|c| c.candidate_id).collect();
        let ranked = run(candidates, MatchFilters::default()).await;
        assert_eq!(ranked.iter().map(|r| r.candidate_id).collect::<Vec<_>>(), ids);
    }

    #[tokio::test]
    async fn test_score_bounds_are_inclusive() {
        let candidates = vec![record(&["a"]), record(&["a", "b"]), record(&["a", "b", "c"])];
        let filters = MatchFilters {
            min_score: Some(10.0),
            max_score: Some(20.0),
            ..Default::default()
        };
        let ranked = run(candidates, filters).await;
        let scores: Vec<f64> = ranked.iter().map(|r| r.result.overall_score).collect();
        assert_eq!(scores, vec![20.0, 10.0]);
    }

    #[tokio::test]
    async fn test_filters_are_and_combined() {
        let candidates = vec![
            record(&["Rust"]),
            record(&["Rust", "Go", "SQL"]),
            record(&["Go", "SQL", "Python"]),
        ];
        let filters = MatchFilters {
            skills: vec!["rust".to_string()],
            min_score: Some(25.0),
            ..Default::default()
        };
        let ranked = run(candidates, filters).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].result.overall_score, 30.0);
    }

    #[tokio::test]
    async fn test_max_results_truncates_after_sorting() {
        let candidates = vec![record(&["a"]), record(&["a", "b", "c"]), record(&["a", "b"])];
        let filters = MatchFilters {
            max_results: Some(2),
            ..Default::default()
        };
        let ranked = run(candidates, filters).await;
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].result.overall_score, 30.0);
        assert_eq!(ranked[1].result.overall_score, 20.0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(run(vec![], MatchFilters::default()).await.is_empty());
    }

    #[test]
    fn test_skill_filter_matching() {
        let candidate = record(&["PostgreSQL", "React"]).candidate;
        assert!(has_required_skills(&candidate, &[]));
        assert!(has_required_skills(&candidate, &["sql".to_string(), "REACT".to_string()]));
        assert!(!has_required_skills(&candidate, &["sql".to_string(), "Vue".to_string()]));
        assert!(has_required_skills(&candidate, &["  ".to_string()]));
    }

    #[test]
    fn test_filter_validation() {
        let inverted = MatchFilters {
            min_score: Some(80.0),
            max_score: Some(20.0),
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(AppError::Validation(_))));
        assert!(MatchFilters::default().validate().is_ok());
        let nan = MatchFilters {
            min_score: Some(f64::NAN),
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }
}
