use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub github_token: Option<String>,
    pub youtube_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,

    // Feature flags
    pub enable_caching: bool,
    pub enable_rate_limiting: bool,

    // Cache
    pub cache_ttl_secs: u64,

    // Per-service rate limits, requests per minute
    pub github_rate_limit: u32,
    pub youtube_rate_limit: u32,
    pub websearch_rate_limit: u32,
    pub llm_rate_limit: u32,

    // Job store
    pub job_retention_secs: u64,
    pub job_sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            github_token: optional_env("GITHUB_TOKEN"),
            youtube_api_key: optional_env("YOUTUBE_API_KEY"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            google_search_engine_id: optional_env("GOOGLE_SEARCH_ENGINE_ID"),
            redis_url: optional_env("REDIS_URL"),
            port: env_parse("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            enable_caching: env_parse("ENABLE_CACHING", true)?,
            enable_rate_limiting: env_parse("ENABLE_RATE_LIMITING", true)?,
            cache_ttl_secs: env_parse("CACHE_TTL_SECS", 3600)?,
            github_rate_limit: env_parse("GITHUB_RATE_LIMIT", 30)?,
            youtube_rate_limit: env_parse("YOUTUBE_RATE_LIMIT", 10)?,
            websearch_rate_limit: env_parse("WEBSEARCH_RATE_LIMIT", 100)?,
            llm_rate_limit: env_parse("LLM_RATE_LIMIT", 50)?,
            job_retention_secs: env_parse("JOB_RETENTION_SECS", 3600)?,
            job_sweep_interval_secs: env_parse("JOB_SWEEP_INTERVAL_SECS", 300)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
