//! Per-run pipeline state.

use tracing::error;

use crate::analysis::CvSource;
use crate::errors::AnalysisError;
use crate::models::cv::CvData;
use crate::models::job::JobRequirements;
use crate::models::recommendation::{RecommendationResult, SkillGap, SkillMatchAnalysis};

/// Inputs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub cv_source: CvSource,
    pub job_description: String,
}

/// Scratch state for a single pipeline run. Owned exclusively by the
/// executor driving that run; discarded once the terminal result has
/// been copied into the job store.
pub struct PipelineContext {
    pub cv_source: CvSource,
    pub job_description: String,

    // Intermediate stage outputs
    pub cv_data: Option<CvData>,
    pub job_requirements: Option<JobRequirements>,
    pub match_analysis: Option<SkillMatchAnalysis>,
    pub skill_gaps: Vec<SkillGap>,
    pub result: Option<RecommendationResult>,

    /// Stage failures, as user-facing messages. Non-empty routes the
    /// state machine to the error terminal.
    pub errors: Vec<String>,

    // Progress mirrored into the job store as stages advance
    pub progress: u8,
    pub current_step: String,
}

impl PipelineContext {
    pub fn new(input: AnalysisInput) -> Self {
        Self {
            cv_source: input.cv_source,
            job_description: input.job_description,
            cv_data: None,
            job_requirements: None,
            match_analysis: None,
            skill_gaps: Vec::new(),
            result: None,
            errors: Vec::new(),
            progress: 0,
            current_step: "Starting...".to_string(),
        }
    }

    pub fn set_progress(&mut self, percentage: u8, step: &str) {
        self.progress = percentage.min(100);
        self.current_step = step.to_string();
    }

    /// Records a stage failure as a user-facing message. The stage itself
    /// returns normally; the state machine decides what happens next.
    pub fn record_error(&mut self, err: AnalysisError) {
        error!("Pipeline stage failed: {err}");
        self.errors.push(err.to_string());
    }

    /// All accumulated errors joined into the single string a failed job
    /// carries.
    pub fn joined_errors(&self) -> String {
        self.errors.join("; ")
    }
}
