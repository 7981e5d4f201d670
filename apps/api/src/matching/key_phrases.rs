//! Key-phrase extraction collaborator used for semantic skill matching and
//! experience relevance.
//!
//! The collaborator is optional. When it is not configured the
//! `DisabledKeyPhrases` stand-in fails every call and the scorers fall back to
//! their documented defaults.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const KEY_PHRASES_PATH: &str = "/text/analytics/v3.1/keyPhrases";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
/// Service-side per-document character limit.
const MAX_DOCUMENT_CHARS: usize = 5120;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum KeyPhraseError {
    #[error("key-phrase service is not configured")]
    Unavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("document rejected: {0}")]
    Document(String),
}

#[async_trait]
pub trait KeyPhraseExtractor: Send + Sync {
    async fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, KeyPhraseError>;
}

/// Stand-in used when no key-phrase service is configured.
pub struct DisabledKeyPhrases;

#[async_trait]
impl KeyPhraseExtractor for DisabledKeyPhrases {
    async fn extract_key_phrases(&self, _text: &str) -> Result<Vec<String>, KeyPhraseError> {
        Err(KeyPhraseError::Unavailable)
    }
}

#[derive(Debug, Serialize)]
struct KeyPhraseRequest<'a> {
    documents: Vec<RequestDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestDocument<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct KeyPhraseResponse {
    #[serde(default)]
    documents: Vec<ResponseDocument>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
struct ResponseDocument {
    #[serde(rename = "keyPhrases", default)]
    key_phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    error: DocumentErrorBody,
}

#[derive(Debug, Deserialize)]
struct DocumentErrorBody {
    message: String,
}

/// Client for a Text-Analytics-style key-phrase endpoint. One document per call.
#[derive(Clone)]
pub struct TextAnalyticsClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl TextAnalyticsClient {
    pub fn new(endpoint: &str, api_key: String) -> Result<Self, KeyPhraseError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl KeyPhraseExtractor for TextAnalyticsClient {
    async fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, KeyPhraseError> {
        let text = truncate_chars(text.trim(), MAX_DOCUMENT_CHARS);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let body = KeyPhraseRequest {
            documents: vec![RequestDocument {
                id: "1",
                language: "en",
                text,
            }],
        };

        let response = self
            .client
            .post(format!("{}{}", self.endpoint, KEY_PHRASES_PATH))
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(KeyPhraseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: KeyPhraseResponse = response.json().await?;
        if let Some(err) = parsed.errors.into_iter().next() {
            return Err(KeyPhraseError::Document(err.error.message));
        }

        let phrases: Vec<String> = parsed
            .documents
            .into_iter()
            .flat_map(|d| d.key_phrases)
            .collect();
        debug!("Extracted {} key phrases", phrases.len());
        Ok(phrases)
    }
}

/// Cuts `text` to at most `max` chars without splitting a code point.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
