//! Job description analysis via LLM structured extraction.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::prompts::{JOB_PARSE_PROMPT_TEMPLATE, JOB_PARSE_SYSTEM};
use crate::analysis::RequirementExtractor;
use crate::errors::AnalysisError;
use crate::llm_client::LlmClient;
use crate::models::job::JobRequirements;

/// Job descriptions shorter than this carry no extractable requirements.
const MIN_JOB_DESCRIPTION_LEN: usize = 30;

pub struct LlmJobAnalyzer {
    llm: LlmClient,
}

impl LlmJobAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RequirementExtractor for LlmJobAnalyzer {
    async fn extract(&self, job_description: &str) -> Result<JobRequirements, AnalysisError> {
        if job_description.trim().len() < MIN_JOB_DESCRIPTION_LEN {
            return Err(AnalysisError::RequirementAnalysis(
                "job description is empty or too short".to_string(),
            ));
        }

        let prompt = JOB_PARSE_PROMPT_TEMPLATE.replace("{job_description}", job_description);
        let requirements: JobRequirements = self
            .llm
            .call_json(&prompt, JOB_PARSE_SYSTEM)
            .await
            .map_err(|e| AnalysisError::RequirementAnalysis(e.to_string()))?;

        info!(
            "Job analysis complete: '{}' with {} required and {} preferred skills",
            requirements.job_title,
            requirements.required_skills.len(),
            requirements.preferred_skills.len()
        );

        Ok(requirements)
    }
}
