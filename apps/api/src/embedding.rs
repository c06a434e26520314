//! Text embedding strategies.
//!
//! Two interchangeable implementations behind one trait: a model-backed
//! embedder (sentence-transformers via the Hugging Face inference API,
//! 384 dims) and a deterministic lexical fallback (100 dims, pure
//! function of the input). Vectors are only comparable within a single
//! strategy; `StoredResume.embedder` carries the strategy name so the
//! search path never mixes them.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::analyzer::prompts::truncate_chars;

pub const MODEL_DIMENSION: usize = 384;
pub const LEXICAL_DIMENSION: usize = 100;

/// The 54 domain terms whose normalized frequencies fill dims 42..96 of
/// the lexical vector. Order is part of the vector layout; do not sort.
const DOMAIN_KEYWORDS: &[&str] = &[
    "experience", "skills", "education", "project", "work", "professional", "team", "development",
    "management", "data", "software", "design", "research", "analysis", "technical", "business",
    "communication", "leadership", "problem", "solution", "technology", "engineering", "science",
    "degree", "university", "college", "bachelor", "master", "phd", "certification", "training",
    "years", "month", "responsible", "lead", "develop", "implement", "create", "analyze", "design",
    "manage", "coordinate", "collaborate", "improve", "increase", "reduce", "support", "maintain",
    "test", "deploy", "build", "architect", "optimize", "innovate",
];

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid embedding response: {0}")]
    Parse(String),
}

/// An embedding strategy. `name` identifies the strategy for the
/// comparability guard; `dimension` is fixed per strategy.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;
    fn dimension(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Model-backed embedder. Fails loudly on any backend problem instead of
/// degrading to a different vector space; strategy substitution is a
/// startup decision, not a per-call one.
pub struct HfEmbedder {
    client: Client,
    api_key: String,
    url: String,
    max_input_chars: usize,
}

impl HfEmbedder {
    pub fn new(api_key: String, url: String, max_input_chars: usize, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            url,
            max_input_chars,
        }
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    fn name(&self) -> &'static str {
        "all-minilm-l6-v2"
    }

    fn dimension(&self) -> usize {
        MODEL_DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let input = truncate_chars(text, self.max_input_chars);
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": input }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        let vector = parse_embedding_payload(payload)?;
        if vector.len() != MODEL_DIMENSION {
            return Err(EmbedError::Parse(format!(
                "expected {MODEL_DIMENSION} dims, got {}",
                vector.len()
            )));
        }
        Ok(vector)
    }
}

/// The API returns either a bare vector or a batch of one.
fn parse_embedding_payload(value: serde_json::Value) -> Result<Vec<f32>, EmbedError> {
    let outer = value
        .as_array()
        .ok_or_else(|| EmbedError::Parse("payload is not an array".to_string()))?;
    let row = match outer.first() {
        Some(serde_json::Value::Array(inner)) => inner,
        Some(_) => outer,
        None => return Err(EmbedError::Parse("payload is empty".to_string())),
    };
    row.iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbedError::Parse("non-numeric element".to_string()))
        })
        .collect()
}

/// Deterministic fallback embedder. Total and reproducible: identical
/// input yields a bit-identical vector.
pub struct LexicalEmbedder;

#[async_trait]
impl Embedder for LexicalEmbedder {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn dimension(&self) -> usize {
        LEXICAL_DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(lexical_embedding(text))
    }
}

/// Computes the 100-dim lexical statistic vector:
/// dims 0..36  char frequencies for a-z0-9, normalized by len+1
/// dims 36..42 structural ratios (length, words, upper/digit/space/punct)
/// dims 42..96 domain keyword term frequencies, normalized by words+1
/// dims 96..100 zero padding
pub fn lexical_embedding(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let char_count = text.chars().count();
    let word_count = text.split_whitespace().count();
    let len_norm = (char_count + 1) as f32;

    let mut embedding = vec![0.0f32; LEXICAL_DIMENSION];

    let mut freq = [0usize; 36];
    for c in lower.chars() {
        match c {
            'a'..='z' => freq[c as usize - 'a' as usize] += 1,
            '0'..='9' => freq[26 + c as usize - '0' as usize] += 1,
            _ => {}
        }
    }
    for (i, count) in freq.iter().enumerate() {
        embedding[i] = *count as f32 / len_norm;
    }

    embedding[36] = char_count as f32 / 1000.0;
    embedding[37] = word_count as f32 / 100.0;
    embedding[38] = text.chars().filter(|c| c.is_uppercase()).count() as f32 / len_norm;
    embedding[39] = text.chars().filter(|c| c.is_ascii_digit()).count() as f32 / len_norm;
    embedding[40] = text.chars().filter(|c| c.is_whitespace()).count() as f32 / len_norm;
    embedding[41] = text.chars().filter(|c| ".,;:!?".contains(*c)).count() as f32 / len_norm;

    let word_norm = (word_count + 1) as f32;
    for (i, keyword) in DOMAIN_KEYWORDS.iter().enumerate() {
        embedding[42 + i] = lower.matches(keyword).count() as f32 / word_norm;
    }

    embedding
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_domain_keyword_table_fills_dims_42_to_96() {
        assert_eq!(DOMAIN_KEYWORDS.len(), 54);
    }

    #[test]
    fn test_lexical_embedding_dimension() {
        assert_eq!(lexical_embedding("any text").len(), LEXICAL_DIMENSION);
        assert_eq!(lexical_embedding("").len(), LEXICAL_DIMENSION);
    }

    #[test]
    fn test_lexical_embedding_is_deterministic() {
        let text = "Senior engineer with 8 years of experience in Python and AWS.";
        let a = lexical_embedding(text);
        let b = lexical_embedding(text);
        assert_eq!(a, b);
    }

    #[test]
    fn test_lexical_embedding_char_frequencies() {
        // "aa" -> freq('a') = 2, normalized by len+1 = 3
        let v = lexical_embedding("aa");
        assert!((v[0] - 2.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(v[1], 0.0);
    }

    #[test]
    fn test_lexical_embedding_structural_ratios() {
        let v = lexical_embedding("Ab 12");
        assert!((v[36] - 0.005).abs() < 1e-6); // 5 chars / 1000
        assert!((v[37] - 0.02).abs() < 1e-6); // 2 words / 100
        assert!((v[38] - 1.0 / 6.0).abs() < 1e-6); // one uppercase
        assert!((v[39] - 2.0 / 6.0).abs() < 1e-6); // two digits
        assert!((v[40] - 1.0 / 6.0).abs() < 1e-6); // one space
        assert_eq!(v[41], 0.0); // no punctuation
    }

    #[test]
    fn test_lexical_embedding_keyword_frequency() {
        // "experience" is keyword 0; two mentions over 3 words -> 2/4
        let v = lexical_embedding("experience experience matters");
        assert!((v[42] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_lexical_embedding_empty_text_is_all_zero() {
        assert!(lexical_embedding("").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_lexical_embedding_tail_padding_is_zero() {
        let v = lexical_embedding("experience skills education");
        assert!(v[96..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_parse_embedding_payload_batch_of_one() {
        let payload = serde_json::json!([[0.1, 0.2, 0.3]]);
        assert_eq!(parse_embedding_payload(payload).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_embedding_payload_bare_vector() {
        let payload = serde_json::json!([0.1, 0.2]);
        assert_eq!(parse_embedding_payload(payload).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_embedding_payload_rejects_non_numeric() {
        let payload = serde_json::json!(["not", "numbers"]);
        assert!(parse_embedding_payload(payload).is_err());
    }

    #[tokio::test]
    async fn test_lexical_embedder_trait_surface() {
        let embedder = LexicalEmbedder;
        assert_eq!(embedder.name(), "lexical");
        assert_eq!(embedder.dimension(), LEXICAL_DIMENSION);
        let v = embedder.embed("some text").await.unwrap();
        assert_eq!(v.len(), LEXICAL_DIMENSION);
    }

    proptest! {
        #[test]
        fn prop_lexical_embedding_always_100_finite_dims(text in ".*") {
            let v = lexical_embedding(&text);
            prop_assert_eq!(v.len(), LEXICAL_DIMENSION);
            prop_assert!(v.iter().all(|x| x.is_finite()));
        }
    }
}
