pub mod health;
pub mod resumes;
pub mod search;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/model/status", get(resumes::handle_model_status))
        .route("/api/resumes/analyze", post(resumes::handle_analyze))
        .route(
            "/api/resumes",
            post(resumes::handle_create).get(resumes::handle_list),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        .route("/api/search", post(search::handle_search))
        .with_state(state)
}
