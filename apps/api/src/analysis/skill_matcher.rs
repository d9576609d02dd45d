//! Skill normalization, fuzzy matching, and gap analysis.
//!
//! Skill names are compared as normalized tokens: lowercased, with `.`,
//! `-`, and spaces removed, so "Node.js", "node js" and "nodejs" all
//! collapse to the same token. Matching tries exact membership first and
//! falls back to a character-level similarity ratio.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;
use tracing::{debug, info};

use crate::models::cv::CvData;
use crate::models::job::{JobRequirements, SkillRequirement};
use crate::models::recommendation::{SkillGap, SkillMatchAnalysis};

/// Minimum similarity ratio for a fuzzy match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Normalizes a single skill name for comparison.
pub fn normalize_skill(name: &str) -> String {
    name.to_lowercase()
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect()
}

/// Normalizes a collection of skill names into a set (duplicates collapse).
pub fn normalize_skills<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| normalize_skill(name.as_ref()))
        .collect()
}

/// Character-sequence similarity ratio in [0, 1].
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

/// Finds the subset of `target` skills covered by `candidate` skills.
///
/// Each target skill matches on exact membership, or on the first
/// candidate whose similarity ratio reaches the threshold. The first
/// qualifying candidate wins; there is no search for the best match.
pub fn find_matches(
    candidate: &BTreeSet<String>,
    target: &BTreeSet<String>,
    threshold: f64,
) -> BTreeSet<String> {
    let mut matches = BTreeSet::new();

    for target_skill in target {
        if candidate.contains(target_skill) {
            matches.insert(target_skill.clone());
            continue;
        }

        for candidate_skill in candidate {
            let similarity = similarity_ratio(target_skill, candidate_skill);
            if similarity >= threshold {
                debug!("Fuzzy match: '{target_skill}' ~ '{candidate_skill}' ({similarity:.2})");
                matches.insert(target_skill.clone());
                break;
            }
        }
    }

    matches
}

/// Analyzes the skill match between a CV and a job's requirements.
pub fn analyze_skill_match(cv: &CvData, job: &JobRequirements) -> SkillMatchAnalysis {
    let cv_skills = normalize_skills(cv.all_skill_names());
    let required = normalize_skills(job.required_skill_names());
    let preferred = normalize_skills(job.preferred_skill_names());

    let matched_required = find_matches(&cv_skills, &required, DEFAULT_SIMILARITY_THRESHOLD);
    let matched_preferred = find_matches(&cv_skills, &preferred, DEFAULT_SIMILARITY_THRESHOLD);

    let missing_required: BTreeSet<String> =
        required.difference(&matched_required).cloned().collect();
    let missing_preferred: BTreeSet<String> =
        preferred.difference(&matched_preferred).cloned().collect();

    // Vacuously fully matched when the job names no required skills.
    let match_percentage = if required.is_empty() {
        100.0
    } else {
        (matched_required.len() as f64 / required.len() as f64) * 100.0
    };
    let match_percentage = (match_percentage * 10.0).round() / 10.0;

    let strengths = identify_strengths(cv, job, &matched_required, &matched_preferred);
    let areas_for_improvement = identify_improvements(&missing_required, &missing_preferred);

    let analysis = SkillMatchAnalysis {
        total_required_skills: required.len(),
        matched_skills: matched_required
            .union(&matched_preferred)
            .cloned()
            .collect(),
        missing_required_skills: in_source_order(&job.required_skills, &missing_required),
        missing_preferred_skills: in_source_order(&job.preferred_skills, &missing_preferred),
        match_percentage,
        strengths,
        areas_for_improvement,
    };

    info!(
        "Skill gap analysis complete: {:.1}% match, {} required skills missing",
        analysis.match_percentage,
        analysis.missing_required_skills.len()
    );

    analysis
}

/// Prioritized gap list: required gaps first, then preferred, each group
/// in the order the job description listed them.
pub fn prioritized_gaps(analysis: &SkillMatchAnalysis, job: &JobRequirements) -> Vec<SkillGap> {
    let mut gaps = Vec::new();

    for skill_name in &analysis.missing_required_skills {
        gaps.push(SkillGap {
            skill_name: skill_name.clone(),
            priority: "required".to_string(),
            category: find_requirement(skill_name, &job.required_skills)
                .and_then(|req| req.category),
            impact: "Critical for role - this is a required skill".to_string(),
        });
    }

    for skill_name in &analysis.missing_preferred_skills {
        gaps.push(SkillGap {
            skill_name: skill_name.clone(),
            priority: "preferred".to_string(),
            category: find_requirement(skill_name, &job.preferred_skills)
                .and_then(|req| req.category),
            impact: "Nice to have - would strengthen your application".to_string(),
        });
    }

    gaps
}

/// Projects a normalized missing-set back onto the job description's
/// source order, deduplicating names that normalize identically.
fn in_source_order(requirements: &[SkillRequirement], missing: &BTreeSet<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::new();
    for req in requirements {
        let normalized = normalize_skill(&req.name);
        if missing.contains(&normalized) && seen.insert(normalized.clone()) {
            ordered.push(normalized);
        }
    }
    ordered
}

fn find_requirement<'a>(
    normalized_name: &str,
    requirements: &'a [SkillRequirement],
) -> Option<&'a SkillRequirement> {
    requirements
        .iter()
        .find(|req| normalize_skill(&req.name) == normalized_name)
}

fn identify_strengths(
    cv: &CvData,
    job: &JobRequirements,
    matched_required: &BTreeSet<String>,
    matched_preferred: &BTreeSet<String>,
) -> Vec<String> {
    let mut strengths = Vec::new();
    let matched_count = matched_required.len() + matched_preferred.len();

    if matched_count > 0 {
        strengths.push(format!(
            "Possesses {matched_count} of the required/preferred skills"
        ));
    }

    if let (Some(candidate_years), Some(min_years)) =
        (cv.total_years_experience, job.min_years_experience)
    {
        if candidate_years >= min_years as f32 {
            strengths.push(format!(
                "Meets experience requirement ({candidate_years} years)"
            ));
        }
    }

    if !cv.education.is_empty() && !job.education_requirements.is_empty() {
        strengths.push("Has relevant educational background".to_string());
    }

    if !cv.certifications.is_empty() {
        strengths.push(format!(
            "Holds {} professional certification(s)",
            cv.certifications.len()
        ));
    }

    if strengths.is_empty() {
        strengths.push("Review your CV to highlight relevant experience".to_string());
    }

    strengths
}

fn identify_improvements(
    missing_required: &BTreeSet<String>,
    missing_preferred: &BTreeSet<String>,
) -> Vec<String> {
    let mut improvements = Vec::new();

    if !missing_required.is_empty() {
        improvements.push(format!(
            "Acquire {} required skill(s) to meet minimum qualifications",
            missing_required.len()
        ));
    }

    if !missing_preferred.is_empty() {
        improvements.push(format!(
            "Consider learning {} preferred skill(s) to strengthen application",
            missing_preferred.len()
        ));
    }

    if improvements.is_empty() {
        improvements
            .push("You meet all skill requirements! Focus on showcasing your experience.".to_string());
    }

    improvements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::Skill;
    use crate::models::job::{SkillCategory, SkillPriority};

    fn cv_with_skills(names: &[&str]) -> CvData {
        CvData {
            skills: names
                .iter()
                .map(|name| Skill {
                    name: name.to_string(),
                    category: None,
                    proficiency: None,
                    years_of_experience: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn job_with_skills(required: &[&str], preferred: &[&str]) -> JobRequirements {
        let requirement = |name: &&str, priority| SkillRequirement {
            name: name.to_string(),
            priority,
            category: None,
            years_required: None,
            description: None,
        };
        JobRequirements {
            job_title: "Engineer".to_string(),
            required_skills: required
                .iter()
                .map(|n| requirement(n, SkillPriority::Required))
                .collect(),
            preferred_skills: preferred
                .iter()
                .map(|n| requirement(n, SkillPriority::Preferred))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalization_strips_dots_dashes_and_spaces() {
        let normalized = normalize_skills(["React.js", "Node.js", "Python 3"]);
        let expected: BTreeSet<String> = ["reactjs", "nodejs", "python3"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(normalized, expected);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for name in ["Node.js", "ASP.NET Core", "ci-cd", "  Rust  "] {
            let once = normalize_skill(name);
            assert_eq!(normalize_skill(&once), once);
        }
    }

    #[test]
    fn test_normalization_is_order_independent() {
        let a = normalize_skills(["Python", "React", "Node.js"]);
        let b = normalize_skills(["Node.js", "Python", "React"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicates_collapse_under_normalization() {
        let normalized = normalize_skills(["Node.js", "nodejs", "NODE JS"]);
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_exact_matches_always_match_regardless_of_threshold() {
        let candidate = normalize_skills(["Python"]);
        let target = normalize_skills(["python"]);
        let matches = find_matches(&candidate, &target, 1.0);
        assert!(matches.contains("python"));
    }

    #[test]
    fn test_fuzzy_match_close_variants() {
        // "python" vs "python3" is well above the 0.85 threshold.
        let candidate = normalize_skills(["Python 3"]);
        let target = normalize_skills(["Python"]);
        let matches = find_matches(&candidate, &target, DEFAULT_SIMILARITY_THRESHOLD);
        assert!(matches.contains("python"));
    }

    #[test]
    fn test_empty_candidate_set_misses_everything() {
        let candidate = BTreeSet::new();
        let target = normalize_skills(["Rust", "Go"]);
        let matches = find_matches(&candidate, &target, DEFAULT_SIMILARITY_THRESHOLD);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_scenario_missing_nodejs() {
        let cv = cv_with_skills(&["Python", "JavaScript", "React"]);
        let job = job_with_skills(&["Python", "React", "Node.js"], &[]);

        let analysis = analyze_skill_match(&cv, &job);
        assert_eq!(analysis.missing_required_skills, vec!["nodejs"]);
        assert!((analysis.match_percentage - 66.7).abs() < 0.1);
    }

    #[test]
    fn test_match_percentage_is_100_when_no_required_skills() {
        let cv = cv_with_skills(&[]);
        let job = job_with_skills(&[], &["Kubernetes"]);

        let analysis = analyze_skill_match(&cv, &job);
        assert_eq!(analysis.match_percentage, 100.0);
        assert_eq!(analysis.total_required_skills, 0);
    }

    #[test]
    fn test_match_percentage_bounded() {
        let cv = cv_with_skills(&["Rust", "Go", "Python"]);
        let job = job_with_skills(&["Rust", "Go"], &[]);

        let analysis = analyze_skill_match(&cv, &job);
        assert!(analysis.match_percentage >= 0.0);
        assert!(analysis.match_percentage <= 100.0);
        assert_eq!(analysis.match_percentage, 100.0);
    }

    #[test]
    fn test_prioritized_gaps_required_before_preferred_in_source_order() {
        let cv = cv_with_skills(&[]);
        let job = job_with_skills(&["Terraform", "Ansible"], &["Grafana"]);

        let analysis = analyze_skill_match(&cv, &job);
        let gaps = prioritized_gaps(&analysis, &job);

        let names: Vec<&str> = gaps.iter().map(|g| g.skill_name.as_str()).collect();
        assert_eq!(names, vec!["terraform", "ansible", "grafana"]);
        assert_eq!(gaps[0].priority, "required");
        assert!(gaps[0].impact.contains("Critical"));
        assert_eq!(gaps[2].priority, "preferred");
        assert!(gaps[2].impact.contains("Nice to have"));
    }

    #[test]
    fn test_prioritized_gaps_carry_category_from_requirement() {
        let cv = cv_with_skills(&[]);
        let mut job = job_with_skills(&["PostgreSQL"], &[]);
        job.required_skills[0].category = Some(SkillCategory::Database);

        let analysis = analyze_skill_match(&cv, &job);
        let gaps = prioritized_gaps(&analysis, &job);
        assert_eq!(gaps[0].category, Some(SkillCategory::Database));
    }

    #[test]
    fn test_similarity_ratio_bounds() {
        assert_eq!(similarity_ratio("rust", "rust"), 1.0);
        let distant = similarity_ratio("nodejs", "javascript");
        assert!((0.0..DEFAULT_SIMILARITY_THRESHOLD).contains(&distant));
    }

    #[test]
    fn test_strengths_mention_certifications_and_experience() {
        let mut cv = cv_with_skills(&["Rust"]);
        cv.total_years_experience = Some(6.0);
        cv.certifications.push(crate::models::cv::Certification {
            name: "CKA".to_string(),
            issuer: "CNCF".to_string(),
            issue_date: None,
            expiry_date: None,
        });
        let mut job = job_with_skills(&["Rust"], &[]);
        job.min_years_experience = Some(5);

        let analysis = analyze_skill_match(&cv, &job);
        assert!(analysis.strengths.iter().any(|s| s.contains("experience requirement")));
        assert!(analysis.strengths.iter().any(|s| s.contains("certification")));
    }
}
