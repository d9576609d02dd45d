//! Structured job-description data as extracted by the LLM.

use serde::{Deserialize, Serialize};

/// Priority level for a skill requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillPriority {
    Required,
    Preferred,
    NiceToHave,
}

/// Categories for organizing skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    ProgrammingLanguage,
    Framework,
    Database,
    Cloud,
    Devops,
    Frontend,
    Backend,
    Mobile,
    DataScience,
    SoftSkill,
    Other,
}

/// A single skill requirement from a job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    pub priority: SkillPriority,
    #[serde(default)]
    pub category: Option<SkillCategory>,
    #[serde(default)]
    pub years_required: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Complete structured job requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub required_skills: Vec<SkillRequirement>,
    #[serde(default)]
    pub preferred_skills: Vec<SkillRequirement>,

    #[serde(default)]
    pub min_years_experience: Option<u32>,
    #[serde(default)]
    pub education_requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

impl JobRequirements {
    pub fn required_skill_names(&self) -> Vec<String> {
        self.required_skills.iter().map(|s| s.name.clone()).collect()
    }

    pub fn preferred_skill_names(&self) -> Vec<String> {
        self.preferred_skills.iter().map(|s| s.name.clone()).collect()
    }
}
