//! Progress feed: a stream of job snapshots for SSE consumers.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;

use crate::jobs::store::{Job, JobStore};
use uuid::Uuid;

struct WatchState {
    store: Arc<JobStore>,
    job_id: Uuid,
    period: Duration,
    first: bool,
    done: bool,
}

/// Produces one snapshot per `period` (the first immediately) until the
/// job reaches a terminal state. The terminal snapshot is emitted, then
/// the stream ends. A job that disappears (swept or deleted) ends the
/// stream immediately.
pub fn watch(store: Arc<JobStore>, job_id: Uuid, period: Duration) -> impl Stream<Item = Job> {
    let state = WatchState {
        store,
        job_id,
        period,
        first: true,
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        if state.first {
            state.first = false;
        } else {
            tokio::time::sleep(state.period).await;
        }

        let job = state.store.get(state.job_id)?;
        if job.status.is_terminal() {
            state.done = true;
        }
        Some((job, state))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::store::JobStatus;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn test_stream_ends_after_terminal_snapshot() {
        let store = Arc::new(JobStore::new(Duration::from_secs(3600)));
        let id = store.create();
        store.set_failed(id, "boom");

        let snapshots: Vec<Job> = watch(store, id, Duration::from_secs(1)).collect().await;

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].status, JobStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_emits_progress_then_terminal() {
        let store = Arc::new(JobStore::new(Duration::from_secs(3600)));
        let id = store.create();
        store.set_processing(id, "working");

        let mut stream = Box::pin(watch(store.clone(), id, Duration::from_secs(1)));

        let first = stream.next().await.unwrap();
        assert_eq!(first.status, JobStatus::Processing);

        store.set_progress(id, 50, "half way");
        let second = stream.next().await.unwrap();
        assert_eq!(second.progress, 50);

        store.set_completed(
            id,
            crate::models::recommendation::RecommendationResult {
                skill_match_analysis: crate::models::recommendation::SkillMatchAnalysis {
                    total_required_skills: 0,
                    matched_skills: vec![],
                    missing_required_skills: vec![],
                    missing_preferred_skills: vec![],
                    match_percentage: 100.0,
                    strengths: vec![],
                    areas_for_improvement: vec![],
                },
                skill_gap_recommendations: vec![],
                overall_assessment: "ok".to_string(),
                estimated_preparation_time: None,
            },
        );
        let terminal = stream.next().await.unwrap();
        assert_eq!(terminal.status, JobStatus::Completed);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_ends_when_job_disappears() {
        let store = Arc::new(JobStore::new(Duration::from_secs(3600)));
        let id = store.create();

        let mut stream = Box::pin(watch(store.clone(), id, Duration::from_secs(1)));
        assert!(stream.next().await.is_some());

        store.delete(id);
        assert!(stream.next().await.is_none());
    }
}
