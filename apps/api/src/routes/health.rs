use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<&'static str, String>,
}

/// GET /
/// Service banner.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Skill Gap Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// GET /api/health
/// Returns service status and dependent service checks.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut services = BTreeMap::new();
    services.insert(
        "llm",
        if state.config.anthropic_api_key.is_empty() {
            "unconfigured".to_string()
        } else {
            "configured".to_string()
        },
    );
    services.insert("job_store", format!("healthy ({} jobs)", state.jobs.len()));
    services.insert("cache", state.cache.backend_name().to_string());

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        services,
    })
}
