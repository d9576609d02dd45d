//! Structured CV data as extracted by the LLM from raw document text.

use serde::{Deserialize, Serialize};

/// A skill extracted from a CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Proficiency level as stated in the CV, e.g. "Expert".
    #[serde(default)]
    pub proficiency: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<f32>,
}

/// A work experience entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub start_date: Option<String>,
    /// End date or "Present".
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub gpa: Option<f32>,
    #[serde(default)]
    pub relevant_coursework: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Complete structured CV data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,

    #[serde(default)]
    pub total_years_experience: Option<f32>,
}

impl CvData {
    /// All skill names from the skills section plus technologies used in
    /// experience entries. Duplicates are kept; normalization collapses them.
    pub fn all_skill_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.skills.iter().map(|s| s.name.clone()).collect();
        for exp in &self.experience {
            names.extend(exp.technologies.iter().cloned());
        }
        names
    }
}
