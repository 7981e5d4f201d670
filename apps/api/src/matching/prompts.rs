// All LLM prompt constants for the Matching module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for AI-assisted candidate/job matching.
pub const MATCH_SYSTEM: &str = "You are an experienced technical recruiter. \
    You assess how well a candidate fits a job opening using only the information provided. \
    Do NOT assume skills or experience the candidate did not state.";

/// Match prompt template.
/// Replace: {score_scale}, {candidate_section}, {job_title}, {job_description},
///          {required_skills}, {required_experience}
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate below against the job opening.

{score_scale}

CANDIDATE:
{candidate_section}

JOB OPENING:
Title: {job_title}
Required experience: {required_experience} years
Required skills: {required_skills}
Description:
{job_description}

Return a JSON object with this EXACT schema:
{
  "overall_match": 72,
  "skills_match": 80,
  "experience_match": 65,
  "education_match": 70,
  "matched_skills": ["JavaScript"],
  "missing_skills": ["Node.js"],
  "strengths": ["Five years of frontend work"],
  "gaps": ["No backend experience"],
  "summary": "One or two sentences explaining the overall score."
}

Rules:
1. `matched_skills` and `missing_skills` contain ONLY skills from the required skills list, spelled as listed
2. Every required skill appears in exactly one of the two lists
3. Judge experience against the required years, not against an ideal candidate"#;

/// Candidate section used when structured profile data is sent.
/// Replace: {skills}, {total_years}, {experience_lines}, {education}
pub const CANDIDATE_PROFILE_SECTION: &str = r#"Skills: {skills}
Total experience: {total_years} years
Experience:
{experience_lines}
Highest education: {education}"#;

/// Candidate section used when the full resume text is available.
/// Replace: {skills}, {resume_text}
pub const CANDIDATE_RESUME_SECTION: &str = r#"Skills: {skills}
Resume:
{resume_text}"#;

/// Summary attached to the neutral result when the AI answer could not be used.
pub const UNABLE_TO_ANALYZE_SUMMARY: &str =
    "Unable to analyze this match automatically. Scores are neutral placeholders.";
