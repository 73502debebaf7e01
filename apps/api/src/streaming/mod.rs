//! Progress stream wire format.
//!
//! Every record is one JSON object framed as an SSE data line (`data: <json>`
//! followed by a blank line, see `to_event`). Exactly three payload shapes exist and they are
//! mutually exclusive:
//!
//! - `{"progress": 0-100, "message": "..."}`
//! - `{"error": "..."}`
//! - `{"result": AnalysisResult}`
//!
//! `error` and `result` are terminal: exactly one of them ends every stream.

pub mod decoder;

use axum::response::sse::Event;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::GENERIC_ANALYSIS_FAILURE;
use crate::models::analysis::AnalysisResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressUpdate {
    pub progress: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorPayload {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultPayload {
    pub result: Box<AnalysisResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamRecord {
    Progress(ProgressUpdate),
    Error(ErrorPayload),
    Result(ResultPayload),
}

impl StreamRecord {
    pub fn progress(progress: u8, message: impl Into<String>) -> Self {
        StreamRecord::Progress(ProgressUpdate {
            progress,
            message: message.into(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamRecord::Error(ErrorPayload {
            error: message.into(),
        })
    }

    pub fn result(result: AnalysisResult) -> Self {
        StreamRecord::Result(ResultPayload {
            result: Box::new(result),
        })
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamRecord::Progress(_))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize stream record: {e}");
            serde_json::json!({ "error": GENERIC_ANALYSIS_FAILURE }).to_string()
        })
    }

    pub fn to_event(&self) -> Event {
        Event::default().data(self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_wire_shape() {
        let record = StreamRecord::progress(30, "Extracting skills...");
        assert_eq!(
            record.to_json(),
            r#"{"progress":30,"message":"Extracting skills..."}"#
        );
        assert!(!record.is_terminal());
    }

    #[test]
    fn test_error_wire_shape() {
        let record = StreamRecord::error("Analysis failed. Please try again.");
        assert_eq!(record.to_json(), r#"{"error":"Analysis failed. Please try again."}"#);
        assert!(record.is_terminal());
    }

    #[test]
    fn test_shapes_are_mutually_exclusive() {
        let progress: StreamRecord =
            serde_json::from_str(r#"{"progress": 65, "message": "Matching"}"#).unwrap();
        assert!(matches!(progress, StreamRecord::Progress(_)));

        let error: StreamRecord = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert_eq!(error, StreamRecord::error("boom"));

        // A payload mixing shapes is not any of them.
        assert!(serde_json::from_str::<StreamRecord>(r#"{"progress": 10, "message": "x", "error": "y"}"#).is_err());
        assert!(serde_json::from_str::<StreamRecord>(r#"{"status": "ok"}"#).is_err());
    }

    #[test]
    fn test_result_payload_parses() {
        let json = r#"{"result": {
            "profile_fit_score": 68.3,
            "skill_match_percentage": 66.7,
            "matched_skills": [{"name": "Python"}, {"name": "Docker"}],
            "missing_skills": [{"skill": "Kubernetes", "importance": "high"}],
            "improvement_suggestions": [],
            "analysis_summary": "ok"
        }}"#;
        let record: StreamRecord = serde_json::from_str(json).unwrap();
        match record {
            StreamRecord::Result(payload) => {
                assert_eq!(payload.result.skill_match_percentage, 66.7);
                assert_eq!(payload.result.matched_skills.len(), 2);
            }
            other => panic!("expected result, got {other:?}"),
        }
    }
}
