use std::sync::Arc;

use crate::analyzer::TierResolver;
use crate::embedding::Embedder;
use crate::rank::RankerConfig;
use crate::repo::ResumeRepository;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is built once at startup and read-only
/// afterwards (the repository synchronizes internally).
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TierResolver>,
    pub embedder: Arc<dyn Embedder>,
    pub repo: Arc<dyn ResumeRepository>,
    pub ranker: RankerConfig,
}
