// Analysis layer: document extraction, LLM-backed structured extraction,
// skill matching, and recommendation generation.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod cv_parser;
pub mod extract;
pub mod job_analyzer;
pub mod prompts;
pub mod recommender;
pub mod skill_matcher;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::AnalysisError;
use crate::models::cv::CvData;
use crate::models::job::JobRequirements;
use crate::models::recommendation::{RecommendationResult, SkillGap, SkillMatchAnalysis};

/// Where a CV comes from: an uploaded document or raw text.
#[derive(Debug, Clone)]
pub enum CvSource {
    File(PathBuf),
    Text(String),
}

/// Extracts a structured candidate profile from a CV source.
///
/// Trait-object seam so the pipeline executor can run against stubs in
/// tests; the production implementation is [`cv_parser::LlmCvParser`].
#[async_trait]
pub trait ProfileParser: Send + Sync {
    async fn parse(&self, source: &CvSource) -> Result<CvData, AnalysisError>;
}

/// Extracts structured requirements from a job description.
#[async_trait]
pub trait RequirementExtractor: Send + Sync {
    async fn extract(&self, job_description: &str) -> Result<JobRequirements, AnalysisError>;
}

/// Produces the full recommendation result for an analyzed skill match.
#[async_trait]
pub trait RecommendationEngine: Send + Sync {
    async fn generate(
        &self,
        job: &JobRequirements,
        analysis: &SkillMatchAnalysis,
        gaps: &[SkillGap],
    ) -> Result<RecommendationResult, AnalysisError>;
}
