//! YouTube Data API search for tutorial videos.

use std::collections::HashMap;
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

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const PROVIDER: &str = "YouTube";
/// Quota resets daily.
const QUOTA_RETRY_AFTER_SECS: u64 = 86_400;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct VideoId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    items: Vec<DetailsItem>,
}

#[derive(Debug, Deserialize)]
struct DetailsItem {
    id: String,
    #[serde(rename = "contentDetails", default)]
    content_details: Option<ContentDetails>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct Statistics {
    #[serde(rename = "viewCount", default)]
    view_count: Option<String>,
    #[serde(rename = "likeCount", default)]
    like_count: Option<String>,
}

#[derive(Default, Clone)]
struct VideoDetails {
    duration: Option<String>,
    views: Option<u64>,
    likes: Option<u64>,
}

/// Client for searching YouTube videos.
pub struct YoutubeSearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
}

impl YoutubeSearchClient {
    pub fn new(
        api_key: Option<String>,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResponseCache>,
        retry: RetryPolicy,
    ) -> Self {
        if api_key.is_some() {
            info!("YouTube client initialized");
        } else {
            warn!("YouTube API key not configured");
        }
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            limiter,
            cache,
            retry,
        }
    }

    async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let Some(api_key) = self.api_key.clone() else {
            // Not configured: nothing to search, not an error.
            return Ok(Vec::new());
        };

        let key = cache_key("youtube.search", &json!({"q": query, "max": max_results}));
        if let Some(cached) = self.cache.get_json::<Vec<Resource>>(&key).await {
            return Ok(cached);
        }

        self.limiter.acquire(services::YOUTUBE, 1, true).await;

        let resources = self
            .retry
            .run("youtube search", AnalysisError::is_retryable, || {
                self.request_once(&api_key, query, max_results)
            })
            .await?;

        self.cache.set_json(&key, &resources).await;
        Ok(resources)
    }

    async fn request_once(
        &self,
        api_key: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let response = self
            .http
            .get(format!("{BASE_URL}/search"))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &max_results.to_string()),
                ("order", "relevance"),
                ("relevanceLanguage", "en"),
                ("safeSearch", "moderate"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::ExternalService {
                provider: PROVIDER,
                status_code: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // A 403 mentioning quotaExceeded is the daily quota ceiling.
            if status.as_u16() == 403 && body.contains("quotaExceeded") {
                return Err(AnalysisError::RateLimited {
                    provider: PROVIDER,
                    retry_after: Some(QUOTA_RETRY_AFTER_SECS),
                });
            }
            return Err(AnalysisError::ExternalService {
                provider: PROVIDER,
                status_code: Some(status.as_u16()),
                message: body,
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

        info!("Found {} videos for '{query}'", data.items.len());

        let video_ids: Vec<String> = data.items.iter().map(|i| i.id.video_id.clone()).collect();
        let details = self.fetch_details(api_key, &video_ids).await;

        let mut resources: Vec<Resource> = data
            .items
            .into_iter()
            .map(|item| {
                let detail = details.get(&item.id.video_id).cloned().unwrap_or_default();
                let relevance = relevance_score(&item.snippet, &detail, query);
                Resource {
                    kind: ResourceKind::Youtube,
                    title: item.snippet.title,
                    url: format!("https://www.youtube.com/watch?v={}", item.id.video_id),
                    description: Some(item.snippet.description),
                    stars: None,
                    language: None,
                    last_updated: None,
                    channel: Some(item.snippet.channel_title),
                    duration: detail.duration,
                    views: detail.views,
                    relevance_score: Some(relevance),
                }
            })
            .collect();

        sort_by_relevance(&mut resources);
        Ok(resources)
    }

    /// Fetches duration and view statistics for a batch of videos.
    /// Failures degrade to missing details, never to a failed search.
    async fn fetch_details(&self, api_key: &str, video_ids: &[String]) -> HashMap<String, VideoDetails> {
        if video_ids.is_empty() {
            return HashMap::new();
        }

        let response = self
            .http
            .get(format!("{BASE_URL}/videos"))
            .query(&[
                ("part", "contentDetails,statistics"),
                ("id", &video_ids.join(",")),
                ("key", api_key),
            ])
            .send()
            .await;

        let data: DetailsResponse = match response {
            Ok(r) if r.status().is_success() => match r.json().await {
                Ok(d) => d,
                Err(e) => {
                    warn!("Failed to parse YouTube video details: {e}");
                    return HashMap::new();
                }
            },
            Ok(r) => {
                warn!("YouTube video details returned {}", r.status());
                return HashMap::new();
            }
            Err(e) => {
                warn!("Failed to fetch YouTube video details: {e}");
                return HashMap::new();
            }
        };

        data.items
            .into_iter()
            .map(|item| {
                let stats = item.statistics.unwrap_or_default();
                let details = VideoDetails {
                    duration: item.content_details.and_then(|c| c.duration),
                    views: stats.view_count.and_then(|v| v.parse().ok()),
                    likes: stats.like_count.and_then(|v| v.parse().ok()),
                };
                (item.id, details)
            })
            .collect()
    }
}

#[async_trait]
impl ResourceSearch for YoutubeSearchClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        skill: &str,
        difficulty: DifficultyLevel,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError> {
        let query = format!("{skill} tutorial {}", difficulty.as_query_term());
        self.search_videos(&query, max_results).await
    }
}

/// Relevance score in [0, 1]: query presence in title/description, a
/// log-scaled view bonus, and a like/view engagement bonus.
fn relevance_score(snippet: &Snippet, details: &VideoDetails, query: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let mut score = 0.0;

    if snippet.title.to_lowercase().contains(&query_lower) {
        score += 0.3;
    }
    if snippet.description.to_lowercase().contains(&query_lower) {
        score += 0.2;
    }

    let views = details.views.unwrap_or(0);
    if views > 0 {
        score += (((views + 1) as f64).log10() / 15.0).min(0.3);

        if let Some(likes) = details.likes {
            let engagement = likes as f64 / views as f64;
            score += (engagement * 20.0).min(0.2);
        }
    }

    score.min(1.0)
}
