//! Remote analysis tier: an OpenRouter-compatible chat-completions API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::prompts::{analysis_prompt, truncate_chars, ANALYSIS_SYSTEM, MAX_PROMPT_CHARS};
use crate::analyzer::response::parse_analysis;
use crate::analyzer::{classify_transport_error, AnalyzeError, ErrorKind};
use crate::models::record::Record;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the remote-API tier. The key is injected configuration; a
/// missing key fails as AuthError before any network round trip.
pub struct RemoteApiAnalyzer {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl RemoteApiAnalyzer {
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url,
            model,
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<Record, AnalyzeError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AnalyzeError::new(ErrorKind::AuthError, "no remote API key configured")
        })?;

        let prompt = analysis_prompt(truncate_chars(text, MAX_PROMPT_CHARS));
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: ANALYSIS_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: 500,
            temperature: 0.1,
            top_p: 0.95,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::new(classify_transport_error(&e), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::new(
                classify_status(status),
                format!("remote API returned {status}: {body}"),
            ));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            AnalyzeError::new(ErrorKind::ParseError, format!("invalid API response: {e}"))
        })?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| {
                AnalyzeError::new(ErrorKind::ParseError, "remote API returned no choices")
            })?;

        debug!(chars = content.len(), "remote analysis response received");
        parse_analysis(content)
    }

    /// Reachability probe for health reporting; does not consume quota.
    pub async fn is_reachable(&self) -> bool {
        let Some(api_key) = self.api_key.as_deref() else {
            return false;
        };
        self.client
            .get(format!("{}/auth/key", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

fn classify_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 | 403 => ErrorKind::AuthError,
        429 => ErrorKind::RateLimited,
        s if s >= 500 => ErrorKind::Unavailable,
        _ => ErrorKind::Unknown,
    }
}
