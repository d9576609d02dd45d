//! Web search for tutorials and learning resources via Google Custom Search.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::cache::{cache_key, ResponseCache};
use crate::errors::AnalysisError;
use crate::integrations::{sort_by_relevance, ResourceSearch, SEARCH_TIMEOUT_SECS};
use crate::models::recommendation::{DifficultyLevel, Resource, ResourceKind};
use crate::rate_limit::{services, RateLimiter};
use crate::retry::RetryPolicy;

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const PROVIDER: &str = "WebSearch";
/// Custom Search quota is hourly for burst limits.
const QUOTA_RETRY_AFTER_SECS: u64 = 3600;
/// Results are restricted to recent content.
const DATE_RESTRICT: &str = "y2";
/// Web results are cached longer than API searches; tutorials age slowly.
const CACHE_TTL_SECS: u64 = 86_400;

/// Domains whose tutorials are worth recommending; everything else is
/// dropped from results.
const TRUSTED_DOMAINS: &[&str] = &[
    "dev.to",
    "medium.com",
    "freecodecamp.org",
    "realpython.com",
    "digitalocean.com",
    "hackernoon.com",
    "towardsdatascience.com",
    "css-tricks.com",
    "smashingmagazine.com",
    "tutorialspoint.com",
    "geeksforgeeks.org",
    "stackoverflow.com",
    "github.io",
    "readthedocs.io",
    "docs.python.org",
    "developer.mozilla.org",
];

/// High-quality domains get a relevance bonus.
const HIGH_QUALITY_DOMAINS: &[&str] = &[
    "freecodecamp.org",
    "realpython.com",
    "developer.mozilla.org",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Client for searching the web using the Google Custom Search API.
pub struct WebSearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
    search_engine_id: Option<String>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
}

impl WebSearchClient {
    pub fn new(
        api_key: Option<String>,
        search_engine_id: Option<String>,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResponseCache>,
        retry: RetryPolicy,
    ) -> Self {
        if api_key.is_some() && search_engine_id.is_some() {
            info!("Web search client initialized");
        } else {
            warn!("Web search not configured (missing API key or search engine ID)");
        }
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            search_engine_id,
            limiter,
            cache,
            retry,
        }
    }

    async fn search_web(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let (Some(api_key), Some(engine_id)) =
            (self.api_key.clone(), self.search_engine_id.clone())
        else {
            return Ok(Vec::new());
        };

        let key = cache_key("websearch.search", &json!({"q": query, "max": max_results}));
        if let Some(cached) = self.cache.get_json::<Vec<Resource>>(&key).await {
            return Ok(cached);
        }

        self.limiter.acquire(services::WEBSEARCH, 1, true).await;

        let resources = self
            .retry
            .run("web search", AnalysisError::is_retryable, || {
                self.request_once(&api_key, &engine_id, query, max_results)
            })
            .await?;

        self.cache
            .set_with_ttl(
                &key,
                serde_json::to_value(&resources).unwrap_or_default(),
                std::time::Duration::from_secs(CACHE_TTL_SECS),
            )
            .await;
        Ok(resources)
    }

    async fn request_once(
        &self,
        api_key: &str,
        engine_id: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let response = self
            .http
            .get(BASE_URL)
            .query(&[
                ("key", api_key),
                ("cx", engine_id),
                ("q", query),
                ("num", &max_results.clamp(1, 10).to_string()), // API max is 10
                ("dateRestrict", DATE_RESTRICT),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::ExternalService {
                provider: PROVIDER,
                status_code: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AnalysisError::RateLimited {
                provider: PROVIDER,
                retry_after: Some(QUOTA_RETRY_AFTER_SECS),
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

        info!("Found {} web results for '{query}'", data.items.len());

        let mut resources: Vec<Resource> = data
            .items
            .into_iter()
            .filter(|item| is_trusted_domain(&item.link))
            .map(|item| {
                let relevance = relevance_score(&item, query);
                Resource {
                    kind: ResourceKind::Tutorial,
                    title: item.title,
                    url: item.link,
                    description: Some(item.snippet),
                    stars: None,
                    language: None,
                    last_updated: None,
                    channel: None,
                    duration: None,
                    views: None,
                    relevance_score: Some(relevance),
                }
            })
            .collect();

        sort_by_relevance(&mut resources);
        resources.truncate(max_results);
        Ok(resources)
    }
}

#[async_trait]
impl ResourceSearch for WebSearchClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        skill: &str,
        difficulty: DifficultyLevel,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let query = format!("{skill} {} project tutorial", difficulty.as_query_term());
        self.search_web(&query, max_results).await
    }
}

fn is_trusted_domain(url: &str) -> bool {
    let url_lower = url.to_lowercase();
    TRUSTED_DOMAINS
        .iter()
        .any(|domain| url_lower.contains(domain))
}

/// Relevance score in [0, 1]: query presence in title/snippet plus a
/// bonus for the highest-quality domains.
fn relevance_score(item: &SearchItem, query: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let mut score: f64 = 0.0;

    if item.title.to_lowercase().contains(&query_lower) {
        score += 0.4;
    }
    if item.snippet.to_lowercase().contains(&query_lower) {
        score += 0.3;
    }

    let url_lower = item.link.to_lowercase();
    if HIGH_QUALITY_DOMAINS
        .iter()
        .any(|domain| url_lower.contains(domain))
    {
        score += 0.3;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str, snippet: &str) -> SearchItem {
        SearchItem {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_trusted_domain_filter() {
        assert!(is_trusted_domain("https://www.freecodecamp.org/news/rust"));
        assert!(is_trusted_domain("https://project.github.io/docs"));
        assert!(!is_trusted_domain("https://example-blogspam.com/rust"));
    }

    #[test]
    fn test_relevance_rewards_quality_domains() {
        let quality = item("rust guide", "https://realpython.com/x", "rust guide");
        let ordinary = item("rust guide", "https://dev.to/x", "rust guide");
        assert!(relevance_score(&quality, "rust guide") > relevance_score(&ordinary, "rust guide"));
    }

    #[test]
    fn test_relevance_is_bounded() {
        let best = item(
            "rust tutorial",
            "https://developer.mozilla.org/rust",
            "rust tutorial",
        );
        let score = relevance_score(&best, "rust tutorial");
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_search_response_parses_custom_search_shape() {
        let json = r#"{
            "items": [
                {"title": "Rust Tutorial", "link": "https://dev.to/rust", "snippet": "Learn Rust"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items[0].link, "https://dev.to/rust");
    }
}
