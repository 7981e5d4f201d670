use anyhow::{bail, Context, Result};

use crate::matching::scorer::FallbackMode;

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables the AI completion client. Without it only rule-based scoring is available.
    pub anthropic_api_key: Option<String>,
    /// Makes the AI-assisted scorer the default backend for `/api/v1/match`.
    pub enable_ai_matching: bool,
    pub ai_fallback: FallbackMode,
    pub key_phrase_endpoint: Option<String>,
    pub key_phrase_api_key: Option<String>,
    pub batch_max_candidates: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            enable_ai_matching: optional("ENABLE_AI_MATCHING")
                .map(|v| parse_bool(&v))
                .transpose()
                .context("ENABLE_AI_MATCHING must be true or false")?
                .unwrap_or(false),
            ai_fallback: optional("AI_FALLBACK")
                .map(|v| v.parse::<FallbackMode>())
                .transpose()
                .context("AI_FALLBACK must be 'rule_based' or 'neutral'")?
                .unwrap_or_default(),
            key_phrase_endpoint: optional("KEY_PHRASE_ENDPOINT"),
            key_phrase_api_key: optional("KEY_PHRASE_API_KEY"),
            batch_max_candidates: optional("BATCH_MAX_CANDIDATES")
                .unwrap_or_else(|| "500".to_string())
                .parse::<usize>()
                .context("BATCH_MAX_CANDIDATES must be a positive integer")?,
        };

        if config.enable_ai_matching && config.anthropic_api_key.is_none() {
            bail!("ENABLE_AI_MATCHING is set but ANTHROPIC_API_KEY is missing");
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean '{other}'"),
    }
}
