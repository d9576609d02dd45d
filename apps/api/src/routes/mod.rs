pub mod analysis;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Uploaded CVs larger than this are rejected outright.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/analyze", post(analysis::handle_analyze))
        .route("/api/status/:job_id", get(analysis::handle_status))
        .route("/api/results/:job_id", get(analysis::handle_results))
        .route("/api/stream/:job_id", get(analysis::handle_stream))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
