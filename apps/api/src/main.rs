mod analyzer;
mod config;
mod embedding;
mod errors;
mod extract;
mod models;
mod rank;
mod repo;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::TierResolver;
use crate::config::Config;
use crate::embedding::{Embedder, HfEmbedder, LexicalEmbedder};
use crate::rank::RankerConfig;
use crate::repo::InMemoryRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResuMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Analyzer tier chain: remote API -> llama.cpp -> ollama -> regex
    let resolver = Arc::new(TierResolver::from_config(&config));
    info!("Analyzer mode: {}", resolver.mode());

    // Embedding strategy is fixed at startup so every stored vector in
    // this process comes from one strategy.
    let embedder: Arc<dyn Embedder> = match &config.hf_api_key {
        Some(key) => {
            let embedder = HfEmbedder::new(
                key.clone(),
                config.hf_embedding_url.clone(),
                config.max_input_chars,
                Duration::from_secs(config.tier_timeout_secs),
            );
            info!("Embedder: model-backed ({})", embedder.name());
            Arc::new(embedder)
        }
        None => {
            info!("Embedder: deterministic lexical fallback");
            Arc::new(LexicalEmbedder)
        }
    };

    let repo = Arc::new(InMemoryRepository::new());

    let state = AppState {
        resolver,
        embedder,
        repo,
        ranker: RankerConfig {
            top_n: config.top_n,
            similarity_floor: config.similarity_floor,
        },
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
