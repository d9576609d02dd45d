use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::jobs::JobStore;
use crate::pipeline::PipelineExecutor;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every collaborator is constructed once in `main` and
/// passed in explicitly; nothing here is a global.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jobs: Arc<JobStore>,
    pub executor: Arc<PipelineExecutor>,
    pub cache: Arc<ResponseCache>,
}
