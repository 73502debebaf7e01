//! Axum route handlers for the Analysis API.

use std::convert::Infallible;

use axum::{
    extract::{multipart::Field, Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::pipeline::{AnalysisRequest, ResumeInput};
use crate::errors::AppError;
use crate::state::AppState;

/// Records buffered between the pipeline and a slow client.
const STREAM_BUFFER: usize = 16;

// ────────────────────────────────────────────────────────────────────────────
// Request parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct AnalyzeForm {
    job_description: Option<String>,
    resume_text: Option<String>,
    resume_file: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    bytes: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("job_description") => form.job_description = Some(text(field).await?),
                Some("resume_text") => form.resume_text = Some(text(field).await?),
                Some("resume_file") => {
                    let content_type = field.content_type().map(str::to_string);
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(invalid_form)?;
                    // Browsers submit an empty part for an untouched file input.
                    if !bytes.is_empty() {
                        form.resume_file = Some(UploadedFile {
                            bytes,
                            content_type,
                            file_name,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn into_request(self) -> Result<AnalysisRequest, AppError> {
        let job_description = self
            .job_description
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;

        // An uploaded file wins over pasted text.
        let resume = match (self.resume_file, self.resume_text) {
            (Some(file), _) => ResumeInput::File {
                bytes: file.bytes,
                content_type: file.content_type,
                file_name: file.file_name,
            },
            (None, Some(text)) if !text.trim().is_empty() => ResumeInput::Text(text),
            _ => {
                return Err(AppError::Validation(
                    "Either a resume file or resume text is required".to_string(),
                ))
            }
        };

        Ok(AnalysisRequest {
            job_description,
            resume,
        })
    }
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(invalid_form)
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid form data: {err}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analysis/analyze
///
/// Multipart form: `job_description`, plus `resume_file` or `resume_text`.
/// Validation failures return 400 before any stream opens. Otherwise the
/// response is an event stream of progress records ending in one `result` or
/// `error` record.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let request = AnalyzeForm::read(multipart).await?.into_request()?;
    let from_file = matches!(request.resume, ResumeInput::File { .. });
    let prepared = state.engine.prepare(request)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("analysis", %request_id);
    span.in_scope(|| info!(from_file, "Analysis request accepted"));

    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    let engine = state.engine.clone();
    tokio::spawn(async move { engine.run(prepared, tx).await }.instrument(span));

    let events = ReceiverStream::new(rx).map(|record| Ok::<_, Infallible>(record.to_event()));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
