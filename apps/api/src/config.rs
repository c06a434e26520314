use anyhow::{bail, Context, Result};

use crate::analyzer::Mode;

/// Application configuration loaded from environment variables.
///
/// Everything has a working default: with no environment at all the
/// service runs in `auto` mode and degrades to regex extraction and the
/// lexical embedder. Credentials are injected here and nowhere else.
#[derive(Debug, Clone)]
pub struct Config {
    pub analyzer_mode: Mode,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub llama_server_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub hf_api_key: Option<String>,
    pub hf_embedding_url: String,
    pub max_input_chars: usize,
    pub top_n: usize,
    pub similarity_floor: f32,
    pub tier_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mode_raw = env_or("ANALYZER_MODE", "auto");
        let analyzer_mode = match Mode::parse(&mode_raw) {
            Some(mode) => mode,
            None => bail!(
                "ANALYZER_MODE '{mode_raw}' is not one of: auto, api, llama_cpp, offline, regex"
            ),
        };

        Ok(Config {
            analyzer_mode,
            openrouter_api_key: env_opt("OPENROUTER_API_KEY"),
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", "https://openrouter.ai/api/v1"),
            openrouter_model: env_or("OPENROUTER_MODEL", "mistralai/mistral-7b-instruct:free"),
            llama_server_url: env_or("LLAMA_SERVER_URL", "http://localhost:8080"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: env_or("OLLAMA_MODEL", "mistral"),
            hf_api_key: env_opt("HUGGINGFACE_API_KEY"),
            hf_embedding_url: env_or(
                "HF_EMBEDDING_URL",
                "https://api-inference.huggingface.co/models/sentence-transformers/all-MiniLM-L6-v2",
            ),
            max_input_chars: env_or("MAX_INPUT_CHARS", "2000")
                .parse()
                .context("MAX_INPUT_CHARS must be a positive integer")?,
            top_n: env_or("TOP_N", "5")
                .parse()
                .context("TOP_N must be a positive integer")?,
            similarity_floor: env_or("SIMILARITY_FLOOR", "0")
                .parse()
                .context("SIMILARITY_FLOOR must be a number")?,
            tier_timeout_secs: env_or("TIER_TIMEOUT_SECS", "10")
                .parse()
                .context("TIER_TIMEOUT_SECS must be a positive integer")?,
            port: env_or("PORT", "8080")
                .parse()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
