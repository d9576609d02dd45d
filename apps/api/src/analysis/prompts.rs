//! Prompt templates for the analysis LLM calls.
//!
//! Placeholders use `{name}` and are filled with simple `str::replace`.
//! Every JSON-returning prompt states its schema explicitly; responses are
//! deserialized directly into the matching model structs.

pub const CV_PARSE_SYSTEM: &str = r#"You are an expert CV analyst. Extract structured data from the CV text you are given.
Your response must be valid JSON matching this schema:
{
  "name": "string or null",
  "email": "string or null",
  "phone": "string or null",
  "summary": "string or null",
  "skills": [
    {"name": "string", "category": "string or null", "proficiency": "string or null", "years_of_experience": number or null}
  ],
  "experience": [
    {"role": "string", "company": "string", "start_date": "string or null", "end_date": "string or null", "duration_months": number or null, "responsibilities": ["string"], "technologies": ["string"]}
  ],
  "education": [
    {"degree": "string", "institution": "string", "graduation_year": number or null, "gpa": number or null, "relevant_coursework": ["string"]}
  ],
  "certifications": [
    {"name": "string", "issuer": "string", "issue_date": "string or null", "expiry_date": "string or null"}
  ],
  "total_years_experience": number or null
}
List every technology mentioned in an experience entry under its "technologies" array.
Return ONLY valid JSON, no additional text."#;

pub const CV_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured data from this CV:

{cv_text}

Return ONLY valid JSON, no additional text."#;

pub const JOB_PARSE_SYSTEM: &str = r#"You are an expert recruiter. Extract structured requirements from the job description you are given.
Your response must be valid JSON matching this schema:
{
  "job_title": "string",
  "company": "string or null",
  "required_skills": [
    {"name": "string", "priority": "required", "category": "programming_language|framework|database|cloud|devops|frontend|backend|mobile|data_science|soft_skill|other", "years_required": number or null, "description": "string or null"}
  ],
  "preferred_skills": [
    {"name": "string", "priority": "preferred", "category": "...", "years_required": number or null, "description": "string or null"}
  ],
  "min_years_experience": number or null,
  "education_requirements": ["string"],
  "responsibilities": ["string"]
}
Skills listed as must-have go in required_skills; nice-to-have skills go in preferred_skills.
Return ONLY valid JSON, no additional text."#;

pub const JOB_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured requirements from this job description:

{job_description}

Return ONLY valid JSON, no additional text."#;

pub const PROJECT_IDEAS_SYSTEM: &str = r#"You are an expert software engineering mentor. Generate practical project ideas to help someone learn a specific skill.
Your response must be valid JSON matching this schema:
{
  "projects": [
    {
      "title": "string",
      "description": "string",
      "skills_covered": ["string"],
      "difficulty": "beginner|intermediate|advanced",
      "estimated_hours": number,
      "key_features": ["string"],
      "learning_outcomes": ["string"]
    }
  ]
}

Generate 3 projects: one beginner, one intermediate, and one advanced.
Make them practical, hands-on, and portfolio-worthy."#;

pub const PROJECT_IDEAS_PROMPT_TEMPLATE: &str = r#"Generate 3 project ideas to learn {skill}.

Skill: {skill}
Category: {category}
Priority: {priority}

Return ONLY valid JSON, no additional text."#;

pub const LEARNING_PATH_SYSTEM: &str = r#"You are an expert learning advisor. Create a concise, actionable learning path for acquiring a specific skill.

IMPORTANT: Format your response as plain text with clear structure. Use simple numbering (1., 2., 3.) for steps.
Do NOT use markdown formatting (no **, ##, ###, or other markdown symbols).
Use simple line breaks and indentation for readability."#;

pub const LEARNING_PATH_PROMPT_TEMPLATE: &str = r#"Create a brief learning path (3-5 steps) for learning {skill}.

Skill: {skill}
Priority: {priority}
Recommended Projects: {project_titles}

Format your response as a numbered list with clear, actionable steps.
Each step should be 1-2 sentences maximum.
Do NOT use markdown formatting (**, ##, etc.) - use plain text only.
Keep it concise (max 200 words)."#;

pub const ASSESSMENT_SYSTEM: &str = r#"You are a career advisor. Provide an encouraging, actionable assessment of a candidate's readiness for a job.

IMPORTANT: Format your response as plain text. Do NOT use markdown formatting (no **, ##, ###, or other markdown symbols).
Use clear section headers followed by colons and organize content with simple numbering or bullet points using hyphens (-)."#;

pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Provide an overall assessment for a candidate applying to: {job_title}

Match Percentage: {match_percentage}%
Matched Skills: {matched_count}
Missing Required Skills: {missing_required_count}
Missing Preferred Skills: {missing_preferred_count}

Strengths:
{strengths}

Areas for Improvement:
{improvements}

Provide:
1. Overall readiness assessment
2. Key recommendations (2-3 points)
3. Encouragement and next steps

IMPORTANT: Use plain text only. Do NOT use markdown formatting (**, ##, etc.).
Use section headers followed by colons (e.g., "Overall Readiness:" or "Key Recommendations:").
Keep it concise (max 250 words) and actionable."#;
