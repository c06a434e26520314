//! Local-inference tiers: a llama.cpp HTTP server and an Ollama daemon.
//! Both run on localhost, speak plain JSON over reqwest, and share the
//! extraction prompt and response parsing with the remote tier.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::analyzer::prompts::{analysis_prompt, truncate_chars, MAX_PROMPT_CHARS};
use crate::analyzer::response::parse_analysis;
use crate::analyzer::{classify_transport_error, AnalyzeError, ErrorKind};
use crate::models::record::Record;

/// llama.cpp server tier (`llama-server` style `/completion` endpoint).
pub struct LlamaCppAnalyzer {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

impl LlamaCppAnalyzer {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<Record, AnalyzeError> {
        let prompt = analysis_prompt(truncate_chars(text, MAX_PROMPT_CHARS));
        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&json!({
                "prompt": prompt,
                "n_predict": 512,
                "temperature": 0.1,
            }))
            .send()
            .await
            .map_err(|e| AnalyzeError::new(classify_transport_error(&e), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::new(
                ErrorKind::Unavailable,
                format!("llama.cpp server returned {status}: {body}"),
            ));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            AnalyzeError::new(
                ErrorKind::ParseError,
                format!("invalid llama.cpp response: {e}"),
            )
        })?;
        debug!(chars = completion.content.len(), "llama.cpp response received");
        parse_analysis(&completion.content)
    }

    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// Ollama tier (`/api/generate`, non-streaming).
pub struct OllamaAnalyzer {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaAnalyzer {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            model,
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<Record, AnalyzeError> {
        let prompt = analysis_prompt(truncate_chars(text, MAX_PROMPT_CHARS));
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.1,
                top_p: 0.95,
                num_predict: 1024,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::new(classify_transport_error(&e), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::new(
                ErrorKind::Unavailable,
                format!("ollama returned {status}: {body}"),
            ));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            AnalyzeError::new(ErrorKind::ParseError, format!("invalid ollama response: {e}"))
        })?;
        debug!(chars = generated.response.len(), "ollama response received");
        parse_analysis(&generated.response)
    }

    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 9 (discard) refuses connections immediately, so these exercise
    // the transport-failure classification without a live server.

    #[tokio::test]
    async fn test_llama_cpp_connection_refused_is_unavailable() {
        let analyzer =
            LlamaCppAnalyzer::new("http://127.0.0.1:9".to_string(), Duration::from_secs(1));
        let err = analyzer.analyze("resume text").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_ollama_connection_refused_is_unavailable() {
        let analyzer = OllamaAnalyzer::new(
            "http://127.0.0.1:9".to_string(),
            "mistral".to_string(),
            Duration::from_secs(1),
        );
        let err = analyzer.analyze("resume text").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_false() {
        let analyzer =
            LlamaCppAnalyzer::new("http://127.0.0.1:9".to_string(), Duration::from_secs(1));
        assert!(!analyzer.is_reachable().await);
    }
}
