mod analysis;
mod cache;
mod config;
mod errors;
mod integrations;
mod jobs;
mod llm_client;
mod models;
mod pipeline;
mod rate_limit;
mod retry;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::cv_parser::LlmCvParser;
use crate::analysis::job_analyzer::LlmJobAnalyzer;
use crate::analysis::recommender::ProjectRecommender;
use crate::cache::ResponseCache;
use crate::config::Config;
use crate::integrations::github::GithubSearchClient;
use crate::integrations::websearch::WebSearchClient;
use crate::integrations::youtube::YoutubeSearchClient;
use crate::jobs::JobStore;
use crate::llm_client::LlmClient;
use crate::pipeline::PipelineExecutor;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skill Gap Analysis API v{}", env!("CARGO_PKG_VERSION"));

    // Shared resource controls
    let limiter = Arc::new(RateLimiter::from_config(&config));
    let cache = Arc::new(ResponseCache::connect(&config).await);
    let retry = RetryPolicy::default();

    // LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), limiter.clone(), retry);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Resource search integrations
    let github = Arc::new(GithubSearchClient::new(
        config.github_token.clone(),
        limiter.clone(),
        cache.clone(),
        retry,
    ));
    let youtube = Arc::new(YoutubeSearchClient::new(
        config.youtube_api_key.clone(),
        limiter.clone(),
        cache.clone(),
        retry,
    ));
    let web = Arc::new(WebSearchClient::new(
        config.google_api_key.clone(),
        config.google_search_engine_id.clone(),
        limiter.clone(),
        cache.clone(),
        retry,
    ));

    // Job store with background retention sweeping
    let jobs = Arc::new(JobStore::new(Duration::from_secs(config.job_retention_secs)));
    jobs.clone()
        .spawn_sweeper(Duration::from_secs(config.job_sweep_interval_secs));

    // Pipeline executor with injected collaborators
    let executor = Arc::new(PipelineExecutor::new(
        jobs.clone(),
        Arc::new(LlmCvParser::new(llm.clone())),
        Arc::new(LlmJobAnalyzer::new(llm.clone())),
        Arc::new(ProjectRecommender::new(llm, github, youtube, web)),
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        jobs,
        executor,
        cache,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
