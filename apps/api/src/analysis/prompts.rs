// Prompts for résumé rewrite suggestions.

use crate::llm_client::prompts::{NO_FABRICATION_INSTRUCTION, PLAIN_TEXT_INSTRUCTION};

pub const REWRITE_SYSTEM: &str =
    "You are an experienced technical recruiter and career coach who helps candidates \
     tailor their résumés to a specific job description.";

/// Builds the rewrite prompt in one pass, so braces in user text stay literal.
pub fn rewrite_prompt(missing_skills: &str, job_excerpt: &str, resume_excerpt: &str) -> String {
    format!(
        r#"A candidate is applying for the job below. Their résumé is missing these skills the job asks for: {missing_skills}.

JOB DESCRIPTION (excerpt):
{job_excerpt}

RÉSUMÉ (excerpt):
{resume_excerpt}

Give 3 to 5 concrete suggestions for rewriting the résumé so it reads as a stronger match for this job. Cover keyword placement, the professional summary, and which existing experience to reframe.

{NO_FABRICATION_INSTRUCTION}

{PLAIN_TEXT_INSTRUCTION}"#
    )
}
