//! CV parsing: raw text extraction followed by LLM structured extraction.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::extract::{extract_text, validate_cv_text};
use crate::analysis::prompts::{CV_PARSE_PROMPT_TEMPLATE, CV_PARSE_SYSTEM};
use crate::analysis::{CvSource, ProfileParser};
use crate::errors::AnalysisError;
use crate::llm_client::LlmClient;
use crate::models::cv::CvData;

/// Production CV parser backed by the shared LLM client.
pub struct LlmCvParser {
    llm: LlmClient,
}

impl LlmCvParser {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ProfileParser for LlmCvParser {
    async fn parse(&self, source: &CvSource) -> Result<CvData, AnalysisError> {
        let cv_text = match source {
            CvSource::File(path) => extract_text(path)?,
            CvSource::Text(text) => {
                validate_cv_text(text)?;
                text.clone()
            }
        };

        let prompt = CV_PARSE_PROMPT_TEMPLATE.replace("{cv_text}", &cv_text);
        let cv_data: CvData = self
            .llm
            .call_json(&prompt, CV_PARSE_SYSTEM)
            .await
            .map_err(|e| AnalysisError::CvParsing(e.to_string()))?;

        info!(
            "Successfully parsed CV with {} skills and {} experiences",
            cv_data.skills.len(),
            cv_data.experience.len()
        );

        Ok(cv_data)
    }
}
