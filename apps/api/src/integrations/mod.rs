// External search integrations: each client composes the shared rate
// limiter, response cache, and retry policy around a single outbound call.
// A failed search degrades to an empty list at the recommender, never
// aborting the job.

pub mod github;
pub mod websearch;
pub mod youtube;

use async_trait::async_trait;

use crate::errors::AnalysisError;
use crate::models::recommendation::{DifficultyLevel, Resource};

/// Per-call timeout for all search APIs.
pub(crate) const SEARCH_TIMEOUT_SECS: u64 = 10;

/// A searchable source of learning resources for a skill.
#[async_trait]
pub trait ResourceSearch: Send + Sync {
    /// Provider name used in logs and error messages.
    fn provider(&self) -> &'static str;

    /// Returns ranked resource descriptors for a skill at a difficulty
    /// level, best first.
    async fn search(
        &self,
        skill: &str,
        difficulty: DifficultyLevel,
        max_results: usize,
    ) -> Result<Vec<Resource>, AnalysisError>;
}

/// Sorts resources by relevance score, best first.
pub(crate) fn sort_by_relevance(resources: &mut [Resource]) {
    resources.sort_by(|a, b| {
        let score_a = a.relevance_score.unwrap_or(0.0);
        let score_b = b.relevance_score.unwrap_or(0.0);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
