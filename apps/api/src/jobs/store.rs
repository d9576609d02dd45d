#![allow(dead_code)]

//! Thread-safe in-memory job store with background retention sweeping.
//!
//! The store is the only resource mutated by more than one logical owner:
//! the pipeline run for a job writes, status/stream readers read, and the
//! sweeper deletes. A single mutex serializes all map access; every
//! critical section is short and does no I/O. Callers get snapshot
//! clones, never live references into the map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::recommendation::RecommendationResult;

/// Job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Snapshot of one tracked analysis job.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// 0-100, monotonically non-decreasing while processing.
    pub progress: u8,
    pub current_step: String,
    pub result: Option<RecommendationResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0,
            current_step: "Initializing...".to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Thread-safe in-memory job store.
pub struct JobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
    retention: Duration,
}

impl JobStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            retention,
        }
    }

    /// Creates a new job in Pending and returns its id. Never fails.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, Job::new(id));
        info!("Created job: {id}");
        id
    }

    /// Snapshot of a job, or `None` when unknown (or already swept).
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Applies `mutate` to a job under the lock, refreshing `updated_at`.
    /// A no-op when the id is unknown.
    fn with_job(&self, id: Uuid, mutate: impl FnOnce(&mut Job)) {
        let mut jobs = self.lock();
        if let Some(job) = jobs.get_mut(&id) {
            mutate(job);
            job.updated_at = Utc::now();
        }
    }

    pub fn set_processing(&self, id: Uuid, step: &str) {
        self.with_job(id, |job| {
            job.status = JobStatus::Processing;
            job.current_step = step.to_string();
        });
        debug!("Job {id} processing: {step}");
    }

    /// Updates job progress, clamping the percentage to [0, 100].
    pub fn set_progress(&self, id: Uuid, percentage: u8, step: &str) {
        self.with_job(id, |job| {
            job.progress = percentage.min(100);
            job.current_step = step.to_string();
        });
        debug!("Job {id} progress: {percentage}% ({step})");
    }

    pub fn set_completed(&self, id: Uuid, result: RecommendationResult) {
        self.with_job(id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.current_step = "Completed".to_string();
            job.result = Some(result);
        });
        info!("Job completed: {id}");
    }

    pub fn set_failed(&self, id: Uuid, error: &str) {
        self.with_job(id, |job| {
            job.status = JobStatus::Failed;
            job.current_step = "Failed".to_string();
            job.error = Some(error.to_string());
        });
        error!("Job failed: {id} - {error}");
    }

    pub fn delete(&self, id: Uuid) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            info!("Deleted job: {id}");
        }
        removed
    }

    /// Removes every terminal job whose last update is older than the
    /// retention window. Jobs still pending or processing are never
    /// swept, regardless of age. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.retention)
                .unwrap_or_else(|_| chrono::Duration::seconds(0));

        let mut jobs = self.lock();
        let expired: Vec<Uuid> = jobs
            .iter()
            .filter(|(_, job)| job.status.is_terminal() && job.updated_at < cutoff)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            jobs.remove(id);
            info!("Cleaned up old job: {id}");
        }

        expired.len()
    }

    /// Spawns the background sweep task for the lifetime of the process.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) {
        info!("Job sweeper started (interval: {}s)", every.as_secs());
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick fires immediately; skip it so a fresh store
            // isn't swept at startup.
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = self.sweep();
                if removed > 0 {
                    info!("Cleaned up {removed} old jobs");
                }
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.lock().expect("job store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::SkillMatchAnalysis;

    fn result_fixture() -> RecommendationResult {
        RecommendationResult {
            skill_match_analysis: SkillMatchAnalysis {
                total_required_skills: 1,
                matched_skills: vec!["rust".to_string()],
                missing_required_skills: vec![],
                missing_preferred_skills: vec![],
                match_percentage: 100.0,
                strengths: vec![],
                areas_for_improvement: vec![],
            },
            skill_gap_recommendations: vec![],
            overall_assessment: "Strong fit".to_string(),
            estimated_preparation_time: None,
        }
    }

    fn store() -> JobStore {
        JobStore::new(Duration::from_secs(3600))
    }

    #[test]
    fn test_created_job_is_pending_with_zero_progress() {
        let store = store();
        let id = store.create();

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_get_unknown_job_is_none() {
        assert!(store().get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_completed_job_keeps_result_and_full_progress() {
        let store = store();
        let id = store.create();

        store.set_completed(id, result_fixture());

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(
            job.result.as_ref().unwrap().overall_assessment,
            "Strong fit"
        );
        assert!(job.error.is_none());

        // Terminal state is stable on subsequent reads.
        let again = store.get(id).unwrap();
        assert_eq!(again.status, JobStatus::Completed);
        assert!(again.result.is_some());
    }

    #[test]
    fn test_failed_job_carries_error_only() {
        let store = store();
        let id = store.create();

        store.set_failed(id, "Failed to parse CV: empty file");

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("Failed to parse CV: empty file"));
        assert!(job.result.is_none());
    }

    #[test]
    fn test_progress_is_clamped_to_100() {
        let store = store();
        let id = store.create();

        store.set_progress(id, 250, "overshoot");
        assert_eq!(store.get(id).unwrap().progress, 100);
    }

    #[test]
    fn test_update_on_unknown_job_is_a_noop() {
        let store = store();
        store.set_progress(Uuid::new_v4(), 50, "ghost");
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutating_a_snapshot_does_not_touch_the_store() {
        let store = store();
        let id = store.create();

        let mut snapshot = store.get(id).unwrap();
        snapshot.progress = 99;
        snapshot.status = JobStatus::Failed;

        let fresh = store.get(id).unwrap();
        assert_eq!(fresh.progress, 0);
        assert_eq!(fresh.status, JobStatus::Pending);
    }

    #[test]
    fn test_updates_refresh_updated_at() {
        let store = store();
        let id = store.create();
        let before = store.get(id).unwrap().updated_at;

        store.set_progress(id, 10, "step");
        let after = store.get(id).unwrap().updated_at;
        assert!(after >= before);
    }

    #[test]
    fn test_sweep_removes_only_old_terminal_jobs() {
        // Zero retention: anything terminal is immediately past the cutoff.
        let store = JobStore::new(Duration::ZERO);

        let completed = store.create();
        store.set_completed(completed, result_fixture());
        let failed = store.create();
        store.set_failed(failed, "boom");
        let processing = store.create();
        store.set_processing(processing, "working");
        let pending = store.create();

        // updated_at must be strictly before the cutoff.
        std::thread::sleep(Duration::from_millis(10));
        let removed = store.sweep();

        assert_eq!(removed, 2);
        assert!(store.get(completed).is_none());
        assert!(store.get(failed).is_none());
        // A job stuck in processing is never swept, regardless of age.
        assert!(store.get(processing).is_some());
        assert!(store.get(pending).is_some());
    }

    #[test]
    fn test_sweep_keeps_recent_terminal_jobs() {
        let store = JobStore::new(Duration::from_secs(3600));
        let id = store.create();
        store.set_completed(id, result_fixture());

        assert_eq!(store.sweep(), 0);
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_delete_reports_whether_job_existed() {
        let store = store();
        let id = store.create();

        assert!(store.delete(id));
        assert!(!store.delete(id));
        assert!(store.get(id).is_none());
    }
}
