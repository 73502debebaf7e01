//! Résumé rewrite suggestions — pluggable advisor behind a trait.
//!
//! Default without an API key: `TemplateResumeAdvisor` (deterministic text).
//! With `ANTHROPIC_API_KEY`: `LlmResumeAdvisor`, which degrades to the template
//! on any LLM failure so a flaky provider never fails an analysis.

use async_trait::async_trait;
use tracing::warn;

use crate::analysis::prompts::{rewrite_prompt, REWRITE_SYSTEM};
use crate::llm_client::LlmClient;

/// Characters of each document passed to the advisor.
pub const EXCERPT_CHARS: usize = 1500;
/// Missing skills named in the request.
pub const MAX_REWRITE_SKILLS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRequest {
    pub resume_excerpt: String,
    pub job_excerpt: String,
    pub missing_skills: Vec<String>,
}

impl RewriteRequest {
    pub fn new(resume: &str, job: &str, missing_skills: &[String]) -> Self {
        Self {
            resume_excerpt: excerpt(resume),
            job_excerpt: excerpt(job),
            missing_skills: missing_skills
                .iter()
                .take(MAX_REWRITE_SKILLS)
                .cloned()
                .collect(),
        }
    }
}

#[async_trait]
pub trait ResumeAdvisor: Send + Sync {
    /// Always yields text; implementations absorb their own failures.
    async fn suggest(&self, request: &RewriteRequest) -> String;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateResumeAdvisor
// ────────────────────────────────────────────────────────────────────────────

pub struct TemplateResumeAdvisor;

#[async_trait]
impl ResumeAdvisor for TemplateResumeAdvisor {
    async fn suggest(&self, request: &RewriteRequest) -> String {
        template_suggestions(&request.missing_skills)
    }

    fn backend(&self) -> &'static str {
        "template"
    }
}

fn template_suggestions(missing_skills: &[String]) -> String {
    format!(
        "Resume Improvement Suggestions:\n\
         1. Add Missing Skills: if you have any experience with {}, name it explicitly in your skills section and in the roles where you used it.\n\
         2. Optimize Keywords: mirror the job description's wording for the tools and practices you already have.\n\
         3. Quantify Achievements: add metrics that show the scale and impact of your work.\n\
         4. Tailor Summary: rewrite your professional summary around the requirements of this role.\n\
         5. Highlight Relevant Projects: showcase projects that demonstrate the skills this role needs.",
        missing_skills.join(", ")
    )
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResumeAdvisor
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeAdvisor(pub LlmClient);

#[async_trait]
impl ResumeAdvisor for LlmResumeAdvisor {
    async fn suggest(&self, request: &RewriteRequest) -> String {
        let prompt = build_prompt(request);
        match self.0.call_text(&prompt, REWRITE_SYSTEM).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Rewrite suggestions fell back to template: {e}");
                template_suggestions(&request.missing_skills)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

fn build_prompt(request: &RewriteRequest) -> String {
    rewrite_prompt(
        &request.missing_skills.join(", "),
        &request.job_excerpt,
        &request.resume_excerpt,
    )
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RewriteRequest {
        RewriteRequest::new(
            "Python developer with Docker experience",
            "Requires: Python, Kubernetes, Docker, Terraform, Helm",
            &[
                "Kubernetes".to_string(),
                "Terraform".to_string(),
                "Helm".to_string(),
                "Istio".to_string(),
            ],
        )
    }

    #[test]
    fn test_request_caps_skills_and_excerpts() {
        let long = "é".repeat(EXCERPT_CHARS + 10);
        let request = RewriteRequest::new(&long, "job", &[]);
        assert_eq!(request.resume_excerpt.chars().count(), EXCERPT_CHARS);
        assert_eq!(self::request().missing_skills, vec!["Kubernetes", "Terraform", "Helm"]);
    }

    #[tokio::test]
    async fn test_template_names_missing_skills() {
        let text = TemplateResumeAdvisor.suggest(&request()).await;
        assert!(text.contains("Kubernetes, Terraform, Helm"));
        assert!(!text.contains("Istio"));
        assert_eq!(TemplateResumeAdvisor.backend(), "template");
    }

    #[test]
    fn test_prompt_fills_every_placeholder() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("Kubernetes, Terraform, Helm"));
        assert!(prompt.contains("Python developer with Docker experience"));
        assert!(prompt.contains("Never invent employers"));
        assert!(!prompt.contains('{'), "unfilled placeholder in: {prompt}");
    }

    #[test]
    fn test_braces_in_documents_stay_literal() {
        let request = RewriteRequest::new(
            "Python developer. Template tokens: {job_excerpt} {missing_skills}",
            "Requires {resume_excerpt} and Kubernetes",
            &["Kubernetes".to_string()],
        );
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Template tokens: {job_excerpt} {missing_skills}"));
        assert!(prompt.contains("Requires {resume_excerpt} and Kubernetes"));
        assert_eq!(prompt.matches("Requires {resume_excerpt}").count(), 1);
        assert_eq!(prompt.matches("Template tokens").count(), 1);
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_template() {
        let client = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_api_url("http://127.0.0.1:9/v1/messages")
            .with_max_retries(1);
        let advisor = LlmResumeAdvisor(client);
        let text = advisor.suggest(&request()).await;
        assert_eq!(text, template_suggestions(&request().missing_skills));
    }
}
