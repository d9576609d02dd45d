//! GitHub repository search for project examples.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::cache::{cache_key, ResponseCache};
use crate::errors::AnalysisError;
use crate::integrations::{sort_by_relevance, ResourceSearch, SEARCH_TIMEOUT_SECS};
use crate::models::recommendation::{DifficultyLevel, Resource, ResourceKind};
use crate::rate_limit::{services, RateLimiter};
use crate::retry::RetryPolicy;

const BASE_URL: &str = "https://api.github.com";
const PROVIDER: &str = "GitHub";
const MIN_STARS: u32 = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RepoItem>,
}

#[derive(Debug, Deserialize)]
struct RepoItem {
    name: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Client for searching GitHub repositories.
pub struct GithubSearchClient {
    http: reqwest::Client,
    token: Option<String>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
}

impl GithubSearchClient {
    pub fn new(
        token: Option<String>,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResponseCache>,
        retry: RetryPolicy,
    ) -> Self {
        if token.is_some() {
            info!("GitHub client initialized with authentication");
        } else {
            warn!("GitHub client initialized without authentication (rate limits apply)");
        }
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            token,
            limiter,
            cache,
            retry,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("skillgap-api"));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("token {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn search_repositories(
        &self,
        query: &str,
        min_stars: u32,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let key = cache_key(
            "github.search",
            &json!({"q": query, "min_stars": min_stars, "max": max_results}),
        );
        if let Some(cached) = self.cache.get_json::<Vec<Resource>>(&key).await {
            return Ok(cached);
        }

        self.limiter.acquire(services::GITHUB, 1, true).await;

        let search_query = format!("{query} stars:>={min_stars}");
        let resources = self
            .retry
            .run("github search", AnalysisError::is_retryable, || {
                self.request_once(&search_query, max_results, query)
            })
            .await?;

        self.cache.set_json(&key, &resources).await;
        Ok(resources)
    }

    async fn request_once(
        &self,
        search_query: &str,
        max_results: usize,
        original_query: &str,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let response = self
            .http
            .get(format!("{BASE_URL}/search/repositories"))
            .headers(self.headers())
            .query(&[
                ("q", search_query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", &max_results.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::ExternalService {
                provider: PROVIDER,
                status_code: None,
                message: e.to_string(),
            })?;

        let status = response.status();

        // Secondary rate limit: 403 with a reset timestamp.
        if status.as_u16() == 403 {
            let retry_after = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok())
                .map(|reset| (reset - Utc::now().timestamp()).max(0) as u64);
            return Err(AnalysisError::RateLimited {
                provider: PROVIDER,
                retry_after,
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ExternalService {
                provider: PROVIDER,
                status_code: Some(status.as_u16()),
                message,
            });
        }

        let data: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::ExternalService {
                    provider: PROVIDER,
                    status_code: None,
                    message: format!("malformed response: {e}"),
                })?;

        info!(
            "Found {} repositories for '{original_query}'",
            data.items.len()
        );

        let mut resources: Vec<Resource> = data
            .items
            .into_iter()
            .map(|repo| {
                let relevance = relevance_score(&repo, original_query);
                Resource {
                    kind: ResourceKind::Github,
                    title: repo.name,
                    url: repo.html_url,
                    description: repo.description,
                    stars: Some(repo.stargazers_count),
                    language: repo.language,
                    last_updated: repo.updated_at,
                    channel: None,
                    duration: None,
                    views: None,
                    relevance_score: Some(relevance),
                }
            })
            .collect();

        sort_by_relevance(&mut resources);
        Ok(resources)
    }
}

#[async_trait]
impl ResourceSearch for GithubSearchClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        skill: &str,
        difficulty: DifficultyLevel,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let query = format!("{skill} {} project example", difficulty.as_query_term());
        self.search_repositories(&query, MIN_STARS, max_results)
            .await
    }
}

/// Relevance score in [0, 1]: query presence in name/description, a
/// log-scaled star bonus, and a recent-activity bonus.
fn relevance_score(repo: &RepoItem, query: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let mut score = 0.0;

    if repo.name.to_lowercase().contains(&query_lower) {
        score += 0.3;
    }

    if let Some(description) = &repo.description {
        if description.to_lowercase().contains(&query_lower) {
            score += 0.2;
        }
    }

    if repo.stargazers_count > 0 {
        score += (((repo.stargazers_count + 1) as f64).log10() / 10.0).min(0.3);
    }

    if let Some(updated_at) = &repo.updated_at {
        if let Ok(updated) = DateTime::parse_from_rfc3339(updated_at) {
            let days_since = (Utc::now() - updated.with_timezone(&Utc)).num_days();
            if (0..180).contains(&days_since) {
                score += 0.2 * (1.0 - days_since as f64 / 180.0);
            }
        }
    }

    score.min(1.0)
}
