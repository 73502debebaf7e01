//! Analysis pipeline — runs the stages for one request and streams progress.
//!
//! STARTED(0) → EXTRACTING(30) → MATCHING_AND_SCORING(65) → PLANNING(90) → DONE(100)
//!
//! Each transition emits a progress record before the stage runs. The run ends
//! with exactly one terminal record: the result, or one error. When the
//! receiver goes away the in-flight stage is dropped and nothing more is sent.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::analysis::embedding::SkillEmbedder;
use crate::analysis::matcher::{match_skills, JobSkill, ResumeSkill};
use crate::analysis::normalizer::{normalize, DocumentRole, NormalizedText};
use crate::analysis::planner::plan;
use crate::analysis::proficiency::{assess_evidence, assess_requirement};
use crate::analysis::rewrite::{ResumeAdvisor, RewriteRequest};
use crate::analysis::scoring::{analysis_summary, profile_fit_score, skill_match_percentage};
use crate::analysis::skill_extractor;
use crate::analysis::vocabulary::SkillVocabulary;
use crate::config::AnalysisSettings;
use crate::documents;
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::streaming::StreamRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    Extracting,
    MatchingAndScoring,
    Planning,
    Done,
}

impl Stage {
    pub fn progress(self) -> u8 {
        match self {
            Stage::Started => 0,
            Stage::Extracting => 30,
            Stage::MatchingAndScoring => 65,
            Stage::Planning => 90,
            Stage::Done => 100,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Stage::Started => "Starting analysis...",
            Stage::Extracting => "Extracting skills from resume and job description...",
            Stage::MatchingAndScoring => "Matching skills and calculating scores...",
            Stage::Planning => "Building your learning plan...",
            Stage::Done => "Analysis complete!",
        }
    }

    fn record(self) -> StreamRecord {
        StreamRecord::progress(self.progress(), self.message())
    }
}

/// The résumé as submitted.
#[derive(Debug, Clone)]
pub enum ResumeInput {
    Text(String),
    File {
        bytes: Bytes,
        content_type: Option<String>,
        file_name: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job_description: String,
    pub resume: ResumeInput,
}

/// A request that passed up-front validation. Uploaded files are only decoded
/// once the stream is open.
#[derive(Debug)]
pub struct PreparedAnalysis {
    job: NormalizedText,
    resume: PreparedResume,
}

#[derive(Debug)]
enum PreparedResume {
    Ready(NormalizedText),
    Pending {
        bytes: Bytes,
        content_type: Option<String>,
        file_name: Option<String>,
    },
}

/// Why a run stopped early.
enum Halt {
    Disconnected,
    Failed(AppError),
}

impl From<AppError> for Halt {
    fn from(err: AppError) -> Self {
        Halt::Failed(err)
    }
}

/// Process-wide analysis dependencies. Built once at startup, shared read-only.
pub struct AnalysisEngine {
    vocabulary: Arc<SkillVocabulary>,
    embedder: Arc<dyn SkillEmbedder>,
    advisor: Arc<dyn ResumeAdvisor>,
    settings: AnalysisSettings,
}

impl AnalysisEngine {
    pub fn new(
        vocabulary: Arc<SkillVocabulary>,
        embedder: Arc<dyn SkillEmbedder>,
        advisor: Arc<dyn ResumeAdvisor>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            vocabulary,
            embedder,
            advisor,
            settings,
        }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn embedder(&self) -> &dyn SkillEmbedder {
        self.embedder.as_ref()
    }

    /// Validation that must fail before any stream is opened.
    pub fn prepare(&self, request: AnalysisRequest) -> Result<PreparedAnalysis, AppError> {
        let limits = &self.settings.limits;
        let job = normalize(&request.job_description, DocumentRole::JobDescription, limits)?;

        let resume = match request.resume {
            ResumeInput::Text(text) => {
                PreparedResume::Ready(normalize(&text, DocumentRole::Resume, limits)?)
            }
            ResumeInput::File {
                bytes,
                content_type,
                file_name,
            } => {
                if bytes.is_empty() {
                    return Err(AppError::Validation("Resume file is empty".to_string()));
                }
                if bytes.len() > limits.max_upload_bytes {
                    return Err(AppError::Validation(format!(
                        "Resume file is too large: {} bytes (maximum {})",
                        bytes.len(),
                        limits.max_upload_bytes
                    )));
                }
                PreparedResume::Pending {
                    bytes,
                    content_type,
                    file_name,
                }
            }
        };

        Ok(PreparedAnalysis { job, resume })
    }

    /// Runs every stage, sending records to `sink`. Never returns an error:
    /// failures become the terminal error record.
    pub async fn run(&self, prepared: PreparedAnalysis, sink: mpsc::Sender<StreamRecord>) {
        let outcome = tokio::select! {
            outcome = self.execute(prepared, &sink) => outcome,
            _ = sink.closed() => Err(Halt::Disconnected),
        };

        match outcome {
            Ok(()) => info!("Analysis complete"),
            Err(Halt::Disconnected) => info!("Client disconnected; analysis stopped"),
            Err(Halt::Failed(err)) => {
                match &err {
                    AppError::Validation(_) | AppError::Extraction(_) => {
                        warn!("Analysis rejected: {err}")
                    }
                    _ => error!("Analysis failed: {err}"),
                }
                // Receiver may already be gone; nothing else to do then.
                let _ = sink.send(StreamRecord::error(err.stream_message())).await;
            }
        }
    }

    async fn execute(
        &self,
        prepared: PreparedAnalysis,
        sink: &mpsc::Sender<StreamRecord>,
    ) -> Result<(), Halt> {
        let PreparedAnalysis { job, resume } = prepared;
        let resume = self.load_resume(resume).await?;

        emit(sink, Stage::Started.record()).await?;

        emit(sink, Stage::Extracting.record()).await?;
        let job_skills: Vec<JobSkill> = skill_extractor::extract_document(&job, &self.vocabulary)
            .into_iter()
            .map(|skill| {
                let requirement = assess_requirement(&skill, &job);
                JobSkill { skill, requirement }
            })
            .collect();
        let resume_skills: Vec<ResumeSkill> =
            skill_extractor::extract_document(&resume, &self.vocabulary)
                .into_iter()
                .map(|skill| {
                    let evidence = assess_evidence(&skill, &resume);
                    ResumeSkill { skill, evidence }
                })
                .collect();
        info!(
            job_skills = job_skills.len(),
            resume_skills = resume_skills.len(),
            "Skills extracted"
        );

        emit(sink, Stage::MatchingAndScoring.record()).await?;
        let report = match_skills(
            &job_skills,
            &resume_skills,
            self.embedder.as_ref(),
            self.settings.thresholds,
        )
        .await?;
        let matched_skills = report.matched();
        let missing_skills = report.missing();
        let weak_skills = report.weak();
        let skill_match_percentage =
            skill_match_percentage(matched_skills.len(), missing_skills.len());
        let profile_fit_score =
            profile_fit_score(&report, job.context.seniority, resume.context.seniority);
        info!(
            matched = matched_skills.len(),
            missing = missing_skills.len(),
            weak = weak_skills.len(),
            profile_fit_score,
            "Skills matched"
        );

        emit(sink, Stage::Planning.record()).await?;
        let improvement_suggestions = plan(&report, &job.context);
        let resume_rewrite_suggestions = if missing_skills.is_empty() {
            None
        } else {
            let names: Vec<String> = missing_skills.iter().map(|m| m.skill.clone()).collect();
            let request = RewriteRequest::new(&resume.text, &job.text, &names);
            debug!(backend = self.advisor.backend(), "Requesting rewrite suggestions");
            Some(self.advisor.suggest(&request).await)
        };

        let result = AnalysisResult {
            profile_fit_score,
            skill_match_percentage,
            analysis_summary: analysis_summary(
                profile_fit_score,
                matched_skills.len(),
                missing_skills.len(),
                weak_skills.len(),
            ),
            matched_skills,
            missing_skills,
            weak_skills,
            improvement_suggestions,
            resume_rewrite_suggestions,
            additional_skills: report.additional_skills,
        };

        emit(sink, Stage::Done.record()).await?;
        emit(sink, StreamRecord::result(result)).await
    }

    /// Decodes an uploaded résumé. Runs before STARTED so a bad file yields a
    /// lone error record.
    async fn load_resume(&self, resume: PreparedResume) -> Result<NormalizedText, AppError> {
        let (bytes, content_type, file_name) = match resume {
            PreparedResume::Ready(text) => return Ok(text),
            PreparedResume::Pending {
                bytes,
                content_type,
                file_name,
            } => (bytes, content_type, file_name),
        };

        let max_unpacked_bytes = self.settings.limits.max_unpacked_bytes();
        let text = tokio::task::spawn_blocking(move || {
            documents::extract_text(
                &bytes,
                content_type.as_deref(),
                file_name.as_deref(),
                max_unpacked_bytes,
            )
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))??;

        Ok(normalize(&text, DocumentRole::Resume, &self.settings.limits)?)
    }
}

async fn emit(sink: &mpsc::Sender<StreamRecord>, record: StreamRecord) -> Result<(), Halt> {
    sink.send(record).await.map_err(|_| Halt::Disconnected)
}
