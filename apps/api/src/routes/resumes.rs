use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::analyzer::{Mode, ResolverStatus};
use crate::errors::AppError;
use crate::models::record::Record;
use crate::models::resume::StoredResume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Optional per-request override of the configured analyzer mode.
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub filename: Option<String>,
    pub text: String,
}

/// GET /api/model/status
pub async fn handle_model_status(State(state): State<AppState>) -> Json<ResolverStatus> {
    Json(state.resolver.status().await)
}

/// POST /api/resumes/analyze
/// Resolves résumé text to a Record without storing anything.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Record>, AppError> {
    let text = require_text(&req.text)?;
    let mode = parse_mode_override(req.mode.as_deref(), &state)?;
    let record = state.resolver.resolve_with(text, mode).await?;
    Ok(Json(record))
}

/// POST /api/resumes
/// Analyzes, embeds, and stores a résumé.
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<StoredResume>), AppError> {
    let text = require_text(&req.text)?;

    let record = state.resolver.resolve(text).await?;
    let embedding = state.embedder.embed(text).await?;

    let resume = StoredResume {
        id: Uuid::new_v4(),
        filename: req.filename.unwrap_or_else(|| "untitled.txt".to_string()),
        uploaded_at: Utc::now(),
        record,
        embedding,
        embedder: state.embedder.name().to_string(),
    };
    state.repo.save(resume.clone()).await?;

    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/resumes
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredResume>>, AppError> {
    Ok(Json(state.repo.list().await?))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredResume>, AppError> {
    state
        .repo
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}

fn require_text(text: &str) -> Result<&str, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    Ok(text)
}

fn parse_mode_override(mode: Option<&str>, state: &AppState) -> Result<Mode, AppError> {
    match mode {
        Some(raw) => Mode::parse(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown mode '{raw}'; expected one of auto, api, llama_cpp, offline, regex"
            ))
        }),
        None => Ok(state.resolver.mode()),
    }
}
