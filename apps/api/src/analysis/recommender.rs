//! Recommendation generation: per-gap project ideas, learning resources,
//! learning paths, and an overall readiness assessment.
//!
//! Resource searches are enrichment only. Any of them may fail without
//! failing the job; the failure is logged and the list left empty. LLM
//! calls here also degrade to canned fallbacks rather than failing the
//! run, matching the same philosophy.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::analysis::prompts::{
    ASSESSMENT_PROMPT_TEMPLATE, ASSESSMENT_SYSTEM, LEARNING_PATH_PROMPT_TEMPLATE,
    LEARNING_PATH_SYSTEM, PROJECT_IDEAS_PROMPT_TEMPLATE, PROJECT_IDEAS_SYSTEM,
};
use crate::analysis::RecommendationEngine;
use crate::errors::AnalysisError;
use crate::integrations::ResourceSearch;
use crate::llm_client::LlmClient;
use crate::models::job::JobRequirements;
use crate::models::recommendation::{
    DifficultyLevel, Project, RecommendationResult, Resource, SkillGap, SkillGapRecommendation,
    SkillMatchAnalysis,
};

/// Only the most impactful gaps get full recommendations.
const MAX_GAPS: usize = 10;
const RESULTS_PER_PROVIDER: usize = 3;
/// Weekly study budget assumed when converting hours to a duration.
const HOURS_PER_WEEK: u32 = 10;

#[derive(Debug, Deserialize)]
struct ProjectIdeas {
    #[serde(default)]
    projects: Vec<Project>,
}

/// Production recommendation engine composing the LLM with the three
/// resource-search providers.
pub struct ProjectRecommender {
    llm: LlmClient,
    github: Arc<dyn ResourceSearch>,
    youtube: Arc<dyn ResourceSearch>,
    web: Arc<dyn ResourceSearch>,
}

impl ProjectRecommender {
    pub fn new(
        llm: LlmClient,
        github: Arc<dyn ResourceSearch>,
        youtube: Arc<dyn ResourceSearch>,
        web: Arc<dyn ResourceSearch>,
    ) -> Self {
        Self {
            llm,
            github,
            youtube,
            web,
        }
    }

    async fn recommend_for_gap(&self, gap: &SkillGap) -> SkillGapRecommendation {
        info!("Generating recommendations for skill: {}", gap.skill_name);

        let projects = self.generate_project_ideas(gap).await;
        let github_resources = self.search_provider(&*self.github, gap).await;
        let youtube_resources = self.search_provider(&*self.youtube, gap).await;
        let web_resources = self.search_provider(&*self.web, gap).await;
        let learning_path = self.generate_learning_path(gap, &projects).await;

        SkillGapRecommendation {
            skill_gap: gap.clone(),
            recommended_projects: projects,
            github_resources,
            youtube_resources,
            web_resources,
            learning_path: Some(learning_path),
        }
    }

    async fn generate_project_ideas(&self, gap: &SkillGap) -> Vec<Project> {
        let category = gap
            .category
            .map(|c| format!("{c:?}"))
            .unwrap_or_else(|| "General".to_string());
        let prompt = PROJECT_IDEAS_PROMPT_TEMPLATE
            .replace("{skill}", &gap.skill_name)
            .replace("{category}", &category)
            .replace("{priority}", &gap.priority);

        match self
            .llm
            .call_json::<ProjectIdeas>(&prompt, PROJECT_IDEAS_SYSTEM)
            .await
        {
            Ok(ideas) if !ideas.projects.is_empty() => ideas.projects,
            Ok(_) => fallback_project(&gap.skill_name),
            Err(e) => {
                warn!(
                    "Failed to generate project ideas for {}: {e}",
                    gap.skill_name
                );
                fallback_project(&gap.skill_name)
            }
        }
    }

    async fn search_provider(&self, provider: &dyn ResourceSearch, gap: &SkillGap) -> Vec<Resource> {
        match provider
            .search(&gap.skill_name, DifficultyLevel::Beginner, RESULTS_PER_PROVIDER)
            .await
        {
            Ok(resources) => resources,
            Err(e) => {
                warn!(
                    "Failed to search {} for {}: {e}",
                    provider.provider(),
                    gap.skill_name
                );
                Vec::new()
            }
        }
    }

    async fn generate_learning_path(&self, gap: &SkillGap, projects: &[Project]) -> String {
        let project_titles: Vec<&str> = projects.iter().map(|p| p.title.as_str()).collect();
        let prompt = LEARNING_PATH_PROMPT_TEMPLATE
            .replace("{skill}", &gap.skill_name)
            .replace("{priority}", &gap.priority)
            .replace("{project_titles}", &project_titles.join(", "));

        match self.llm.call(&prompt, LEARNING_PATH_SYSTEM).await {
            Ok(response) => match response.text() {
                Some(text) => text.trim().to_string(),
                None => fallback_learning_path(&gap.skill_name),
            },
            Err(e) => {
                warn!(
                    "Failed to generate learning path for {}: {e}",
                    gap.skill_name
                );
                fallback_learning_path(&gap.skill_name)
            }
        }
    }

    async fn generate_overall_assessment(
        &self,
        job: &JobRequirements,
        analysis: &SkillMatchAnalysis,
    ) -> String {
        let bullet_list = |lines: &[String]| {
            lines
                .iter()
                .map(|line| format!("- {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let prompt = ASSESSMENT_PROMPT_TEMPLATE
            .replace("{job_title}", &job.job_title)
            .replace("{match_percentage}", &analysis.match_percentage.to_string())
            .replace("{matched_count}", &analysis.matched_skills.len().to_string())
            .replace(
                "{missing_required_count}",
                &analysis.missing_required_skills.len().to_string(),
            )
            .replace(
                "{missing_preferred_count}",
                &analysis.missing_preferred_skills.len().to_string(),
            )
            .replace("{strengths}", &bullet_list(&analysis.strengths))
            .replace("{improvements}", &bullet_list(&analysis.areas_for_improvement));

        match self.llm.call(&prompt, ASSESSMENT_SYSTEM).await {
            Ok(response) => match response.text() {
                Some(text) => text.trim().to_string(),
                None => fallback_assessment(analysis.match_percentage),
            },
            Err(e) => {
                warn!("Failed to generate overall assessment: {e}");
                fallback_assessment(analysis.match_percentage)
            }
        }
    }
}

#[async_trait]
impl RecommendationEngine for ProjectRecommender {
    async fn generate(
        &self,
        job: &JobRequirements,
        analysis: &SkillMatchAnalysis,
        gaps: &[SkillGap],
    ) -> Result<RecommendationResult, AnalysisError> {
        let mut recommendations = Vec::new();
        for gap in gaps.iter().take(MAX_GAPS) {
            recommendations.push(self.recommend_for_gap(gap).await);
        }

        let overall_assessment = self.generate_overall_assessment(job, analysis).await;
        let estimated_preparation_time = estimate_preparation_time(&recommendations);

        info!(
            "Generated {} skill gap recommendations",
            recommendations.len()
        );

        Ok(RecommendationResult {
            skill_match_analysis: analysis.clone(),
            skill_gap_recommendations: recommendations,
            overall_assessment,
            estimated_preparation_time: Some(estimated_preparation_time),
        })
    }
}

fn fallback_project(skill_name: &str) -> Vec<Project> {
    vec![Project {
        title: format!("Learn {skill_name}"),
        description: format!("A hands-on project to learn {skill_name}"),
        skills_covered: vec![skill_name.to_string()],
        difficulty: DifficultyLevel::Beginner,
        estimated_hours: Some(20),
        key_features: vec![
            "Core concepts".to_string(),
            "Practical application".to_string(),
        ],
        learning_outcomes: vec![format!("Understand {skill_name} fundamentals")],
    }]
}

fn fallback_learning_path(skill_name: &str) -> String {
    format!(
        "1. Learn {skill_name} fundamentals\n2. Build practice projects\n3. Apply to real-world scenarios"
    )
}

fn fallback_assessment(match_percentage: f64) -> String {
    if match_percentage >= 80.0 {
        "You're well-qualified for this role! Focus on highlighting your relevant experience and consider learning the remaining skills to strengthen your application.".to_string()
    } else if match_percentage >= 60.0 {
        "You have a solid foundation for this role. Focus on acquiring the missing required skills through the recommended projects to improve your candidacy.".to_string()
    } else {
        "This role requires significant skill development. Focus on the required skills first, starting with the beginner projects. With dedicated effort, you can build the necessary expertise.".to_string()
    }
}

/// Estimates preparation time from the beginner project of each
/// recommendation, converted to weeks at a part-time study pace.
fn estimate_preparation_time(recommendations: &[SkillGapRecommendation]) -> String {
    let mut total_hours: u32 = 0;

    for rec in recommendations {
        let beginner = rec
            .recommended_projects
            .iter()
            .find(|p| p.difficulty == DifficultyLevel::Beginner)
            .or_else(|| rec.recommended_projects.first());
        if let Some(project) = beginner {
            total_hours += project.estimated_hours.unwrap_or(20);
        }
    }

    let weeks = total_hours / HOURS_PER_WEEK;
    if weeks < 4 {
        format!("Approximately {weeks} weeks with consistent practice ({HOURS_PER_WEEK} hours/week)")
    } else if weeks < 12 {
        format!(
            "Approximately {weeks} weeks ({} months) with consistent practice",
            weeks / 4
        )
    } else {
        format!(
            "Approximately {} months with consistent practice and dedication",
            weeks / 4
        )
    }
}
