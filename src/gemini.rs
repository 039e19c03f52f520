//! Minimal client for the Gemini `generateContent` API.
//!
//! Single-turn only: one prompt in, the first candidate's text out.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};
use tracing::debug;

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("Gemini request timed out")]
    Timeout,
    #[error("failed to send Gemini request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gemini request failed ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("Gemini API error: {0}")]
    Api(String),
    #[error("Gemini response did not contain any text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Sends `prompt` as a single user turn and returns the reply text.
    pub async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GeminiError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending Gemini request");

        let fut = async {
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&payload)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = timeout(Duration::from_millis(self.config.timeout_ms), fut)
            .await
            .map_err(|_| GeminiError::Timeout)??;

        if !status.is_success() {
            return Err(GeminiError::Status { status, body });
        }

        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<String, GeminiError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GeminiError::Api(format!("unreadable response body: {e}")))?;

    if let Some(error) = response.error {
        return Err(GeminiError::Api(error.message));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }

    Ok(text)
}
