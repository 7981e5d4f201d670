//! Skills Matcher: partitions a job's required skills into matched and
//! missing against a candidate's skill set.
//!
//! Matching runs in three tiers, first hit wins:
//! 1. exact, case-insensitive
//! 2. substring in either direction ("react" ↔ "react native")
//! 3. key-phrase similarity above `SEMANTIC_MATCH_THRESHOLD`, only when the
//!    key-phrase collaborator answers

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::matching::key_phrases::{KeyPhraseError, KeyPhraseExtractor};
use crate::matching::similarity::best_similarity;

/// Similarity a key phrase must exceed to count as a semantic match.
pub const SEMANTIC_MATCH_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    /// matched / required × 100
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Subset of `matched_skills` that only matched through tier 3.
    pub semantic_matches: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Direct,
    Semantic,
    Missing,
}

/// Lower-cased, trimmed, non-empty candidate skills, ready for comparison.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Tier 1 and 2: exact or substring match against normalized candidate skills.
pub fn is_direct_match(required_lower: &str, candidate_lower: &[String]) -> bool {
    candidate_lower.iter().any(|c| {
        c == required_lower || required_lower.contains(c.as_str()) || c.contains(required_lower)
    })
}

/// Matches `candidate_skills` against `required_skills`. Never fails: a
/// key-phrase error leaves unresolved skills missing.
///
/// Every required entry lands in exactly one of the two lists, spelled and
/// ordered as given. Duplicates are kept and blank entries are always missing.
pub async fn match_skills(
    candidate_skills: &[String],
    required_skills: &[String],
    key_phrases: &dyn KeyPhraseExtractor,
) -> SkillMatch {
    if required_skills.is_empty() {
        return SkillMatch {
            score: 100.0,
            ..Default::default()
        };
    }

    let candidate_lower = normalize_skills(candidate_skills);

    let mut outcomes: Vec<(&str, String, Outcome)> = required_skills
        .iter()
        .map(|skill| {
            let lower = skill.trim().to_lowercase();
            let outcome = if !lower.is_empty() && is_direct_match(&lower, &candidate_lower) {
                Outcome::Direct
            } else {
                Outcome::Missing
            };
            (skill.as_str(), lower, outcome)
        })
        .collect();

    let has_unresolved = outcomes
        .iter()
        .any(|(_, lower, o)| *o == Outcome::Missing && !lower.is_empty());
    if has_unresolved && !candidate_lower.is_empty() {
        match candidate_phrases(candidate_skills, key_phrases).await {
            Ok(phrases) => {
                for (_, lower, outcome) in outcomes
                    .iter_mut()
                    .filter(|(_, lower, o)| *o == Outcome::Missing && !lower.is_empty())
                {
                    let best = best_similarity(lower.as_str(), phrases.iter().map(String::as_str));
                    if best > SEMANTIC_MATCH_THRESHOLD {
                        *outcome = Outcome::Semantic;
                    }
                }
            }
            Err(KeyPhraseError::Unavailable) => {}
            Err(e) => warn!("Key-phrase extraction failed, semantic skill matching skipped: {e}"),
        }
    }

    let mut result = SkillMatch::default();
    for (skill, _, outcome) in outcomes {
        match outcome {
            Outcome::Direct => result.matched_skills.push(skill.to_string()),
            Outcome::Semantic => {
                result.matched_skills.push(skill.to_string());
                result.semantic_matches.push(skill.to_string());
            }
            Outcome::Missing => result.missing_skills.push(skill.to_string()),
        }
    }
    result.score = result.matched_skills.len() as f64 / required_skills.len() as f64 * 100.0;
    result
}

async fn candidate_phrases(
    candidate_skills: &[String],
    key_phrases: &dyn KeyPhraseExtractor,
) -> Result<Vec<String>, KeyPhraseError> {
    let text = candidate_skills.join(", ");
    let phrases = key_phrases.extract_key_phrases(&text).await?;
    Ok(phrases.iter().map(|p| p.trim().to_lowercase()).collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::matching::key_phrases::DisabledKeyPhrases;

    /// Returns a fixed phrase list and counts how often it was asked.
    pub(crate) struct FixedPhrases {
        pub phrases: Vec<String>,
        pub calls: AtomicUsize,
    }

    impl FixedPhrases {
        pub(crate) fn new(phrases: &[&str]) -> Self {
            Self {
                phrases: phrases.iter().map(|p| p.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl KeyPhraseExtractor for FixedPhrases {
        async fn extract_key_phrases(&self, _text: &str) -> Result<Vec<String>, KeyPhraseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.phrases.clone())
        }
    }

    pub(crate) struct FailingPhrases;

    #[async_trait]
    impl KeyPhraseExtractor for FailingPhrases {
        async fn extract_key_phrases(&self, _text: &str) -> Result<Vec<String>, KeyPhraseError> {
            Err(KeyPhraseError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn assert_partition(required: &[String], result: &SkillMatch) {
        for skill in required {
            let in_matched = result.matched_skills.contains(skill);
            let in_missing = result.missing_skills.contains(skill);
            assert!(in_matched ^ in_missing, "{skill} must be in exactly one list");
        }
        assert_eq!(
            result.matched_skills.len() + result.missing_skills.len(),
            required.len()
        );
    }

    #[tokio::test]
    async fn test_javascript_react_vs_javascript_node() {
        let required = strings(&["JavaScript", "Node.js"]);
        let result = match_skills(&strings(&["JavaScript", "React"]), &required, &DisabledKeyPhrases).await;
        assert_eq!(result.matched_skills, vec!["JavaScript"]);
        assert_eq!(result.missing_skills, vec!["Node.js"]);
        assert_eq!(result.score, 50.0);
        assert_partition(&required, &result);
    }

    #[tokio::test]
    async fn test_no_requirements_is_full_match() {
        let result = match_skills(&strings(&["Rust"]), &[], &DisabledKeyPhrases).await;
        assert_eq!(result.score, 100.0);
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
    }

    #[tokio::test]
    async fn test_exact_match_is_case_insensitive_and_keeps_job_casing() {
        let result = match_skills(&strings(&["python"]), &strings(&["Python"]), &DisabledKeyPhrases).await;
        assert_eq!(result.matched_skills, vec!["Python"]);
    }

    #[tokio::test]
    async fn test_substring_match_both_directions() {
        let required = strings(&["React Native", "SQL"]);
        let result = match_skills(&strings(&["react", "PostgreSQL"]), &required, &DisabledKeyPhrases).await;
        assert_eq!(result.matched_skills, vec!["React Native", "SQL"]);
        assert_eq!(result.score, 100.0);
    }

    #[tokio::test]
    async fn test_blank_candidate_skills_never_match() {
        let required = strings(&["Go"]);
        let result = match_skills(&strings(&["", "   "]), &required, &DisabledKeyPhrases).await;
        assert_eq!(result.missing_skills, vec!["Go"]);
        assert_eq!(result.score, 0.0);
    }

    #[tokio::test]
    async fn test_semantic_match_through_key_phrases() {
        let phrases = FixedPhrases::new(&["Kubernets"]);
        let required = strings(&["Kubernetes", "Terraform"]);
        let result = match_skills(&strings(&["Kubernets"]), &required, &phrases).await;
        assert_eq!(result.matched_skills, vec!["Kubernetes"]);
        assert_eq!(result.semantic_matches, vec!["Kubernetes"]);
        assert_eq!(result.missing_skills, vec!["Terraform"]);
        assert_partition(&required, &result);
    }

    #[tokio::test]
    async fn test_key_phrases_not_called_when_all_matched() {
        let phrases = FixedPhrases::new(&["anything"]);
        let _ = match_skills(&strings(&["Rust"]), &strings(&["rust"]), &phrases).await;
        assert_eq!(phrases.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_key_phrases_called_once_for_many_unresolved() {
        let phrases = FixedPhrases::new(&[]);
        let required = strings(&["Kafka", "Spark", "Flink"]);
        let _ = match_skills(&strings(&["Excel"]), &required, &phrases).await;
        assert_eq!(phrases.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_collaborator_error_marks_missing() {
        let required = strings(&["Kubernetes"]);
        let result = match_skills(&strings(&["Kubernets"]), &required, &FailingPhrases).await;
        assert_eq!(result.missing_skills, vec!["Kubernetes"]);
        assert!(result.semantic_matches.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_padded_and_blank_requirements_all_partitioned() {
        let required = strings(&["Rust", "rust", " Go ", ""]);
        let result = match_skills(&strings(&["Rust"]), &required, &DisabledKeyPhrases).await;
        assert_eq!(result.matched_skills, vec!["Rust", "rust"]);
        assert_eq!(result.missing_skills, vec![" Go ", ""]);
        assert_eq!(result.score, 50.0);
        assert_partition(&required, &result);
    }

    #[tokio::test]
    async fn test_case_duplicates_count_in_denominator() {
        let required = strings(&["Rust", "rust", "Go"]);
        let result = match_skills(&strings(&["rust"]), &required, &DisabledKeyPhrases).await;
        assert!((result.score - 200.0 / 3.0).abs() < 1e-9);
        assert_partition(&required, &result);
    }

    #[tokio::test]
    async fn test_blank_requirement_skips_key_phrases() {
        let phrases = FixedPhrases::new(&["anything"]);
        let required = strings(&["Rust", "  "]);
        let result = match_skills(&strings(&["Rust"]), &required, &phrases).await;
        assert_eq!(result.missing_skills, vec!["  "]);
        assert_eq!(phrases.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_output_follows_required_order() {
        let required = strings(&["C", "B", "A"]);
        let result = match_skills(&strings(&["a", "c"]), &required, &DisabledKeyPhrases).await;
        assert_eq!(result.matched_skills, vec!["C", "A"]);
        assert_eq!(result.missing_skills, vec!["B"]);
    }

    #[test]
    fn test_normalize_skills_dedupes() {
        let normalized = normalize_skills(&strings(&["Rust", " rust", "Go", ""]));
        assert_eq!(normalized, vec!["rust", "go"]);
    }
}
