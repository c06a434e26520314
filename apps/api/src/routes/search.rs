use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::record::Record;
use crate::rank::{rank, CandidateFilter, RankerConfig};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub filters: Option<CandidateFilter>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: Uuid,
    pub filename: String,
    #[serde(flatten)]
    pub record: Record,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// POST /api/search
/// Embeds the recruiter query and ranks stored résumés against it.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }

    let query_embedding = state.embedder.embed(&req.query).await?;
    let resumes = state.repo.list().await?;

    // Vectors are only comparable within one embedding strategy; skip
    // anything embedded by a different one.
    let eligible: Vec<_> = resumes
        .iter()
        .filter(|r| r.embedder == state.embedder.name())
        .collect();
    let candidates: Vec<(Record, Vec<f32>)> = eligible
        .iter()
        .map(|r| (r.record.clone(), r.embedding.clone()))
        .collect();

    let config = RankerConfig {
        top_n: req.top_n.unwrap_or(state.ranker.top_n),
        similarity_floor: state.ranker.similarity_floor,
    };
    let ranked = rank(&query_embedding, &candidates, req.filters.as_ref(), &config);

    let results = ranked
        .into_iter()
        .map(|rc| {
            let stored = eligible[rc.index];
            SearchResult {
                id: stored.id,
                filename: stored.filename.clone(),
                record: rc.record,
                score: rc.score,
            }
        })
        .collect();

    Ok(Json(SearchResponse { results }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::State;
    use chrono::Utc;

    use crate::analyzer::{AnalyzerTier, Mode, TierResolver};
    use crate::embedding::{lexical_embedding, LexicalEmbedder};
    use crate::extract;
    use crate::models::resume::StoredResume;
    use crate::repo::{InMemoryRepository, ResumeRepository};

    async fn state_with(resumes: Vec<StoredResume>) -> AppState {
        let repo = Arc::new(InMemoryRepository::new());
        for resume in resumes {
            repo.save(resume).await.unwrap();
        }
        AppState {
            resolver: Arc::new(TierResolver::new(
                Mode::Regex,
                vec![AnalyzerTier::Regex],
                Duration::from_secs(1),
            )),
            embedder: Arc::new(LexicalEmbedder),
            repo,
            ranker: RankerConfig::default(),
        }
    }

    fn stored(filename: &str, text: &str, embedder: &str) -> StoredResume {
        StoredResume {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
            record: extract::analyze(text),
            embedding: lexical_embedding(text),
            embedder: embedder.to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_skips_candidates_from_other_embedder() {
        let text = "Senior Software Engineer\n8 years of experience with Python and AWS";
        let state = state_with(vec![
            stored("lexical.txt", text, "lexical"),
            stored("model.txt", text, "all-minilm-l6-v2"),
        ])
        .await;

        let req = SearchRequest {
            query: "python engineer with aws experience".to_string(),
            filters: None,
            top_n: None,
        };
        let Json(response) = handle_search(State(state), Json(req)).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].filename, "lexical.txt");
    }

    #[tokio::test]
    async fn test_search_honors_top_n_override() {
        let texts = [
            "Software Engineer with Python experience",
            "Data Analyst skilled in SQL and statistics",
            "Project Manager with leadership experience",
        ];
        let resumes = texts
            .iter()
            .enumerate()
            .map(|(i, t)| stored(&format!("{i}.txt"), t, "lexical"))
            .collect();
        let state = state_with(resumes).await;

        let req = SearchRequest {
            query: "experienced engineer".to_string(),
            filters: None,
            top_n: Some(2),
        };
        let Json(response) = handle_search(State(state), Json(req)).await.unwrap();
        assert_eq!(response.results.len(), 2);
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let state = state_with(vec![]).await;
        let req = SearchRequest {
            query: "   ".to_string(),
            filters: None,
            top_n: None,
        };
        assert!(handle_search(State(state), Json(req)).await.is_err());
    }
}
