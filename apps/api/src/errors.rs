use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::normalizer::NormalizeError;
use crate::documents::ExtractionError;

/// Message sent to callers for any internal analysis failure. Causes stay in the logs.
pub const GENERIC_ANALYSIS_FAILURE: &str = "Analysis failed. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, empty, too short or oversized input. Rejected before any stream opens.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uploaded résumé could not be turned into text.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// A pipeline stage failed (e.g. the similarity model is unavailable).
    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    /// Text carried by a terminal `error` stream record.
    /// Validation and extraction reasons are user-actionable; everything else is generic.
    pub fn stream_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Extraction(e) => format!("Error processing file: {e}"),
            AppError::Analysis(_) | AppError::Llm(_) | AppError::Internal(_) => {
                GENERIC_ANALYSIS_FAILURE.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::Analysis(msg) => {
                tracing::error!("Analysis error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_ERROR",
                    GENERIC_ANALYSIS_FAILURE.to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
