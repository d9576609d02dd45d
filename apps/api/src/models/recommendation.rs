//! Output data models for the gap analysis and recommendation pipeline.

use serde::{Deserialize, Serialize};

/// Project difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    /// Query keyword used by the resource search integrations.
    pub fn as_query_term(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

/// Types of learning resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Github,
    Youtube,
    Documentation,
    Tutorial,
    Course,
}

/// A recommended hands-on project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub skills_covered: Vec<String>,
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub estimated_hours: Option<u32>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub learning_outcomes: Vec<String>,
}

/// A learning resource (GitHub repo, YouTube video, web tutorial).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,

    // GitHub-specific fields
    #[serde(default)]
    pub stars: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,

    // YouTube-specific fields
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,

    /// Provider-specific relevance score in [0, 1].
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

/// A required or preferred skill missing from the candidate's CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_name: String,
    /// "required" or "preferred".
    pub priority: String,
    #[serde(default)]
    pub category: Option<crate::models::job::SkillCategory>,
    /// Impact description, e.g. "Critical for role".
    pub impact: String,
}

/// Complete recommendation for a single skill gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapRecommendation {
    pub skill_gap: SkillGap,
    #[serde(default)]
    pub recommended_projects: Vec<Project>,
    #[serde(default)]
    pub github_resources: Vec<Resource>,
    #[serde(default)]
    pub youtube_resources: Vec<Resource>,
    #[serde(default)]
    pub web_resources: Vec<Resource>,
    #[serde(default)]
    pub learning_path: Option<String>,
}

/// Analysis of skill match between CV and job requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMatchAnalysis {
    pub total_required_skills: usize,
    pub matched_skills: Vec<String>,
    pub missing_required_skills: Vec<String>,
    pub missing_preferred_skills: Vec<String>,
    /// Percentage of required skills matched, in [0, 100].
    pub match_percentage: f64,

    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

/// Complete result of one analysis job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub skill_match_analysis: SkillMatchAnalysis,
    pub skill_gap_recommendations: Vec<SkillGapRecommendation>,
    pub overall_assessment: String,
    #[serde(default)]
    pub estimated_preparation_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_serde_lowercase() {
        let d: DifficultyLevel = serde_json::from_str(r#""intermediate""#).unwrap();
        assert_eq!(d, DifficultyLevel::Intermediate);
        assert_eq!(
            serde_json::to_string(&DifficultyLevel::Beginner).unwrap(),
            r#""beginner""#
        );
    }

    #[test]
    fn test_project_deserializes_from_llm_shape() {
        let json = r#"{
            "title": "Build a REST API",
            "description": "A CRUD service",
            "skills_covered": ["Node.js"],
            "difficulty": "beginner",
            "estimated_hours": 20,
            "key_features": ["Routing"],
            "learning_outcomes": ["HTTP basics"]
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.difficulty, DifficultyLevel::Beginner);
        assert_eq!(project.estimated_hours, Some(20));
    }

    #[test]
    fn test_resource_optional_fields_default() {
        let json = r#"{"kind": "github", "title": "repo", "url": "https://example.com"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.kind, ResourceKind::Github);
        assert!(resource.stars.is_none());
        assert!(resource.relevance_score.is_none());
    }
}
