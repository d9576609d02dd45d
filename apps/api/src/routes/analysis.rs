//! Axum route handlers for the analysis job API.

use std::convert::Infallible;
use std::io::Write;
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::CvSource;
use crate::errors::AppError;
use crate::jobs::{watch, JobStatus};
use crate::models::recommendation::RecommendationResult;
use crate::pipeline::AnalysisInput;
use crate::state::AppState;

/// Snapshot cadence for the SSE progress stream.
const STREAM_PERIOD: Duration = Duration::from_secs(1);

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub current_step: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub result: Option<RecommendationResult>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct StreamEvent {
    job_id: Uuid,
    status: JobStatus,
    progress: u8,
    message: String,
    error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze
///
/// Multipart upload: a `job_description` text field and a `cv_file`
/// document. Creates a job, spawns the pipeline run against it, and
/// returns the job id for tracking.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut job_description: Option<String> = None;
    let mut cv_file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job_description: {e}")))?;
                job_description = Some(text);
            }
            "cv_file" => {
                let filename = field.file_name().unwrap_or("cv.pdf").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid cv_file: {e}")))?;
                cv_file = Some((filename, content.to_vec()));
            }
            _ => {}
        }
    }

    let job_description = job_description
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;
    let (filename, content) = cv_file
        .filter(|(_, content)| !content.is_empty())
        .ok_or_else(|| AppError::Validation("CV file must be provided".to_string()))?;

    // Persist the upload to a temp file carrying the original extension,
    // so the extractor can dispatch on it. The file is removed when the
    // pipeline run finishes.
    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("pdf")
        .to_lowercase();
    let temp_path = {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to save upload: {e}")))?;
        file.write_all(&content)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to save upload: {e}")))?;
        file.into_temp_path()
    };
    info!("Saved uploaded CV ({} bytes) for analysis", content.len());

    let job_id = state.jobs.create();
    let executor = state.executor.clone();
    let input = AnalysisInput {
        cv_source: CvSource::File(temp_path.to_path_buf()),
        job_description,
    };
    tokio::spawn(async move {
        executor.run(job_id, input).await;
        // Dropping the temp path deletes the uploaded file.
        drop(temp_path);
    });

    info!("Started analysis job: {job_id}");

    Ok(Json(AnalyzeResponse {
        job_id,
        status: JobStatus::Pending,
        message: "Analysis job created successfully".to_string(),
        created_at: Utc::now(),
    }))
}

/// GET /api/status/:job_id
///
/// Current status and progress of an analysis job.
pub async fn handle_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let job = state
        .jobs
        .get(job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    Ok(Json(JobStatusResponse {
        job_id,
        status: job.status,
        progress: job.progress,
        current_step: job.current_step,
        created_at: job.created_at,
        updated_at: job.updated_at,
        error: job.error,
    }))
}

/// GET /api/results/:job_id
///
/// Terminal result (or error) of an analysis job.
pub async fn handle_results(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ResultsResponse>, AppError> {
    let job = state
        .jobs
        .get(job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    Ok(Json(ResultsResponse {
        job_id,
        status: job.status,
        result: job.result,
        error: job.error,
    }))
}

/// GET /api/stream/:job_id
///
/// Server-Sent Events: one status snapshot per second until the job
/// reaches a terminal state.
pub async fn handle_stream(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.jobs.get(job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    info!("SSE stream started for job: {job_id}");

    let stream = watch(state.jobs.clone(), job_id, STREAM_PERIOD).map(|job| {
        let payload = StreamEvent {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            message: job.current_step,
            error: job.error,
        };
        let event = Event::default().json_data(&payload).unwrap_or_else(|e| {
            error!("Failed to encode SSE event: {e}");
            Event::default().data("{}")
        });
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
