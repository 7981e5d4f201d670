use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::llm_client::{LlmClient, MODEL};
use crate::matching::ai_matcher::AiAssistedScorer;
use crate::matching::key_phrases::{DisabledKeyPhrases, KeyPhraseExtractor, TextAnalyticsClient};
use crate::matching::scorer::{MatchScorer, RuleBasedScorer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Backend used by `/api/v1/match` and batch matching. Rule-based unless
    /// ENABLE_AI_MATCHING is set.
    pub match_scorer: Arc<dyn MatchScorer>,
    pub rule_based: Arc<dyn MatchScorer>,
    /// Present only when an Anthropic API key is configured.
    pub ai_scorer: Option<Arc<dyn MatchScorer>>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let key_phrases: Arc<dyn KeyPhraseExtractor> =
            match (&config.key_phrase_endpoint, &config.key_phrase_api_key) {
                (Some(endpoint), Some(api_key)) => {
                    info!("Key-phrase client initialized ({endpoint})");
                    Arc::new(
                        TextAnalyticsClient::new(endpoint, api_key.clone())
                            .context("Failed to build key-phrase HTTP client")?,
                    )
                }
                _ => {
                    info!("Key-phrase service not configured; semantic matching disabled");
                    Arc::new(DisabledKeyPhrases)
                }
            };

        let rule_based: Arc<dyn MatchScorer> =
            Arc::new(RuleBasedScorer::new(Arc::clone(&key_phrases)));

        let ai_scorer: Option<Arc<dyn MatchScorer>> = match &config.anthropic_api_key {
            Some(api_key) => {
                let llm = LlmClient::new(api_key.clone()).context("Failed to build LLM HTTP client")?;
                info!(
                    "LLM client initialized (model: {MODEL}, fallback: {:?})",
                    config.ai_fallback
                );
                Some(Arc::new(AiAssistedScorer::new(
                    Arc::new(llm),
                    config.ai_fallback,
                    RuleBasedScorer::new(Arc::clone(&key_phrases)),
                )))
            }
            None => None,
        };

        let match_scorer = match (&ai_scorer, config.enable_ai_matching) {
            (Some(ai), true) => Arc::clone(ai),
            _ => Arc::clone(&rule_based),
        };

        Ok(Self {
            config,
            match_scorer,
            rule_based,
            ai_scorer,
        })
    }
}
