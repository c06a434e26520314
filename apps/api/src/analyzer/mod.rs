//! Tiered analysis resolver.
//!
//! Analysis backends are a closed set of tiers tried in a fixed priority
//! order: remote API, llama.cpp, Ollama, then deterministic regex. In
//! `auto` mode a tier failure advances to the next tier; the regex tier
//! never fails, so `auto` always terminates with a Record. An explicit
//! mode runs exactly one tier and surfaces its failure typed, so a
//! misconfigured backend is diagnosable instead of silently papered over.

pub mod local;
pub mod prompts;
pub mod remote;
pub mod response;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analyzer::local::{LlamaCppAnalyzer, OllamaAnalyzer};
use crate::analyzer::remote::RemoteApiAnalyzer;
use crate::config::Config;
use crate::extract;
use crate::models::record::Record;

/// Analyzer selection. `Auto` walks the tier chain; the others pin a
/// single backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Auto,
    Api,
    LlamaCpp,
    Offline,
    Regex,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Mode> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(Mode::Auto),
            "api" => Some(Mode::Api),
            "llama_cpp" => Some(Mode::LlamaCpp),
            "offline" => Some(Mode::Offline),
            "regex" => Some(Mode::Regex),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Api => "api",
            Mode::LlamaCpp => "llama_cpp",
            Mode::Offline => "offline",
            Mode::Regex => "regex",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure classification for a tier. Retryable kinds may succeed on a
/// later attempt or a different tier; AuthError is terminal for its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthError,
    RateLimited,
    Unavailable,
    Timeout,
    ParseError,
    Unknown,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::Timeout)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthError => "auth_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("analysis failed ({kind}): {message}")]
pub struct AnalyzeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AnalyzeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Maps a reqwest transport failure onto the tier error taxonomy.
pub(crate) fn classify_transport_error(e: &reqwest::Error) -> ErrorKind {
    if e.is_timeout() {
        ErrorKind::Timeout
    } else if e.is_connect() {
        ErrorKind::Unavailable
    } else {
        ErrorKind::Unknown
    }
}

/// One analysis backend. A closed set so the tier chain is statically
/// enumerable and each variant is testable in isolation.
pub enum AnalyzerTier {
    RemoteApi(RemoteApiAnalyzer),
    LlamaCpp(LlamaCppAnalyzer),
    Offline(OllamaAnalyzer),
    Regex,
}

impl AnalyzerTier {
    pub fn mode(&self) -> Mode {
        match self {
            AnalyzerTier::RemoteApi(_) => Mode::Api,
            AnalyzerTier::LlamaCpp(_) => Mode::LlamaCpp,
            AnalyzerTier::Offline(_) => Mode::Offline,
            AnalyzerTier::Regex => Mode::Regex,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalyzerTier::RemoteApi(_) => "remote-api",
            AnalyzerTier::LlamaCpp(_) => "llama-cpp",
            AnalyzerTier::Offline(_) => "offline",
            AnalyzerTier::Regex => "regex",
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<Record, AnalyzeError> {
        match self {
            AnalyzerTier::RemoteApi(a) => a.analyze(text).await,
            AnalyzerTier::LlamaCpp(a) => a.analyze(text).await,
            AnalyzerTier::Offline(a) => a.analyze(text).await,
            AnalyzerTier::Regex => Ok(extract::analyze(text)),
        }
    }

    pub async fn is_reachable(&self) -> bool {
        match self {
            AnalyzerTier::RemoteApi(a) => a.is_reachable().await,
            AnalyzerTier::LlamaCpp(a) => a.is_reachable().await,
            AnalyzerTier::Offline(a) => a.is_reachable().await,
            AnalyzerTier::Regex => true,
        }
    }
}

/// Health payload for the model-status endpoint.
#[derive(Debug, Serialize)]
pub struct ResolverStatus {
    pub status: &'static str,
    pub message: String,
    pub using_fallback: bool,
    pub mode: Mode,
}

/// Owns the ordered tier chain and the configured mode. Built once at
/// startup; never mutated afterwards, so concurrent resolve() calls need
/// no synchronization.
pub struct TierResolver {
    mode: Mode,
    tiers: Vec<AnalyzerTier>,
    tier_timeout: Duration,
}

impl TierResolver {
    pub fn new(mode: Mode, tiers: Vec<AnalyzerTier>, tier_timeout: Duration) -> Self {
        Self {
            mode,
            tiers,
            tier_timeout,
        }
    }

    /// Builds the standard chain [remote-api, llama-cpp, offline, regex]
    /// from injected configuration.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.tier_timeout_secs);
        let tiers = vec![
            AnalyzerTier::RemoteApi(RemoteApiAnalyzer::new(
                config.openrouter_api_key.clone(),
                config.openrouter_base_url.clone(),
                config.openrouter_model.clone(),
                timeout,
            )),
            AnalyzerTier::LlamaCpp(LlamaCppAnalyzer::new(
                config.llama_server_url.clone(),
                timeout,
            )),
            AnalyzerTier::Offline(OllamaAnalyzer::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                timeout,
            )),
            AnalyzerTier::Regex,
        ];
        Self::new(config.analyzer_mode, tiers, timeout)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Resolves with the configured mode.
    pub async fn resolve(&self, text: &str) -> Result<Record, AnalyzeError> {
        self.resolve_with(text, self.mode).await
    }

    /// Resolves with an explicit mode override.
    pub async fn resolve_with(&self, text: &str, mode: Mode) -> Result<Record, AnalyzeError> {
        match mode {
            Mode::Auto => {
                for tier in &self.tiers {
                    match self.run_tier(tier, text).await {
                        Ok(record) => {
                            debug!(tier = tier.label(), "analysis tier succeeded");
                            return Ok(record);
                        }
                        Err(e) => {
                            warn!(
                                tier = tier.label(),
                                kind = %e.kind,
                                retryable = e.kind.is_retryable(),
                                "analysis tier failed; trying next: {}",
                                e.message
                            );
                        }
                    }
                }
                // Unreachable while the regex tier is in the chain.
                Err(AnalyzeError::new(
                    ErrorKind::Unknown,
                    "no analyzer tier produced a result",
                ))
            }
            explicit => {
                let tier = self
                    .tiers
                    .iter()
                    .find(|t| t.mode() == explicit)
                    .ok_or_else(|| {
                        AnalyzeError::new(
                            ErrorKind::Unavailable,
                            format!("no tier configured for mode {explicit}"),
                        )
                    })?;
                self.run_tier(tier, text).await
            }
        }
    }

    /// Runs one tier under the wall-clock budget. The timeout wrapper
    /// isolates slow backends from the rest of the chain: an elapsed
    /// budget becomes a Timeout failure and evaluation moves on.
    async fn run_tier(&self, tier: &AnalyzerTier, text: &str) -> Result<Record, AnalyzeError> {
        if let AnalyzerTier::Regex = tier {
            return tier.analyze(text).await;
        }
        match tokio::time::timeout(self.tier_timeout, tier.analyze(text)).await {
            Ok(result) => result,
            Err(_) => Err(AnalyzeError::new(
                ErrorKind::Timeout,
                format!(
                    "tier {} exceeded {}s budget",
                    tier.label(),
                    self.tier_timeout.as_secs()
                ),
            )),
        }
    }

    /// Non-mutating reachability report for the configured mode. Used by
    /// health reporting, not by the resolve path.
    pub async fn status(&self) -> ResolverStatus {
        match self.mode {
            Mode::Regex => ResolverStatus {
                status: "available",
                message: "Using regex-based analysis (no LLM)".to_string(),
                using_fallback: false,
                mode: Mode::Regex,
            },
            Mode::Auto => {
                for tier in &self.tiers {
                    if tier.is_reachable().await {
                        let is_regex = matches!(tier, AnalyzerTier::Regex);
                        return ResolverStatus {
                            status: "available",
                            message: if is_regex {
                                "Using regex-based analysis (no LLM)".to_string()
                            } else {
                                format!("{} backend is available", tier.label())
                            },
                            using_fallback: is_regex,
                            mode: tier.mode(),
                        };
                    }
                }
                ResolverStatus {
                    status: "unavailable",
                    message: "No analysis backend available".to_string(),
                    using_fallback: true,
                    mode: Mode::Regex,
                }
            }
            explicit => {
                let reachable = match self.tiers.iter().find(|t| t.mode() == explicit) {
                    Some(tier) => tier.is_reachable().await,
                    None => false,
                };
                ResolverStatus {
                    status: if reachable { "available" } else { "unavailable" },
                    message: format!(
                        "{} backend is {}",
                        explicit,
                        if reachable { "available" } else { "not available" }
                    ),
                    using_fallback: !reachable,
                    mode: explicit,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::EducationLevel;

    // Tiers pointed at port 9 (discard) fail with connection refused
    // immediately, which exercises the fallback chain without a network.
    fn unreachable_resolver(mode: Mode) -> TierResolver {
        let timeout = Duration::from_secs(2);
        let tiers = vec![
            AnalyzerTier::RemoteApi(RemoteApiAnalyzer::new(
                Some("test-key".to_string()),
                "http://127.0.0.1:9".to_string(),
                "test-model".to_string(),
                timeout,
            )),
            AnalyzerTier::LlamaCpp(LlamaCppAnalyzer::new(
                "http://127.0.0.1:9".to_string(),
                timeout,
            )),
            AnalyzerTier::Offline(OllamaAnalyzer::new(
                "http://127.0.0.1:9".to_string(),
                "mistral".to_string(),
                timeout,
            )),
            AnalyzerTier::Regex,
        ];
        TierResolver::new(mode, tiers, timeout)
    }

    #[test]
    fn test_mode_parse_round_trip() {
        for s in ["auto", "api", "llama_cpp", "offline", "regex"] {
            assert_eq!(Mode::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(Mode::parse("LLAMA_CPP"), Some(Mode::LlamaCpp));
        assert_eq!(Mode::parse("gpu"), None);
    }

    #[test]
    fn test_error_kind_retryable_classification() {
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::AuthError.is_retryable());
        assert!(!ErrorKind::ParseError.is_retryable());
    }

    #[tokio::test]
    async fn test_auto_mode_falls_through_to_regex() {
        let resolver = unreachable_resolver(Mode::Auto);
        let record = resolver
            .resolve("Jane Doe\njane@example.com\n5 years of experience with Python")
            .await
            .unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.experience_years, 5.0);
        assert!(record.skills.contains(&"Python".to_string()));
    }

    #[tokio::test]
    async fn test_auto_mode_succeeds_on_empty_input() {
        let resolver = unreachable_resolver(Mode::Auto);
        let record = resolver.resolve("").await.unwrap();
        assert_eq!(record.name, "Unknown");
        assert_eq!(record.education_level, EducationLevel::Bachelors);
    }

    #[tokio::test]
    async fn test_regex_mode_never_fails() {
        let resolver = unreachable_resolver(Mode::Regex);
        assert!(resolver.resolve("").await.is_ok());
        assert!(resolver.resolve("\n\n\n").await.is_ok());
    }

    #[tokio::test]
    async fn test_explicit_mode_surfaces_failure() {
        let resolver = unreachable_resolver(Mode::LlamaCpp);
        let err = resolver.resolve("some resume").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_explicit_api_mode_without_key_is_auth_error() {
        let timeout = Duration::from_secs(2);
        let tiers = vec![
            AnalyzerTier::RemoteApi(RemoteApiAnalyzer::new(
                None,
                "http://127.0.0.1:9".to_string(),
                "test-model".to_string(),
                timeout,
            )),
            AnalyzerTier::Regex,
        ];
        let resolver = TierResolver::new(Mode::Api, tiers, timeout);
        let err = resolver.resolve("some resume").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthError);
    }

    #[tokio::test]
    async fn test_mode_override_beats_configured_mode() {
        let resolver = unreachable_resolver(Mode::LlamaCpp);
        let record = resolver.resolve_with("text", Mode::Regex).await.unwrap();
        assert_eq!(record.role, "Professional");
    }

    #[tokio::test]
    async fn test_status_regex_mode() {
        let resolver = unreachable_resolver(Mode::Regex);
        let status = resolver.status().await;
        assert_eq!(status.status, "available");
        assert!(!status.using_fallback);
        assert_eq!(status.mode, Mode::Regex);
    }

    #[tokio::test]
    async fn test_status_auto_mode_reports_regex_fallback() {
        let resolver = unreachable_resolver(Mode::Auto);
        let status = resolver.status().await;
        assert_eq!(status.status, "available");
        assert!(status.using_fallback);
        assert_eq!(status.mode, Mode::Regex);
    }

    #[tokio::test]
    async fn test_status_explicit_unreachable_backend() {
        let resolver = unreachable_resolver(Mode::Offline);
        let status = resolver.status().await;
        assert_eq!(status.status, "unavailable");
        assert!(status.using_fallback);
        assert_eq!(status.mode, Mode::Offline);
    }
}
