//! Document extraction — turns an uploaded résumé (PDF, DOCX, TXT) into plain text.
//!
//! Contract: `extract_text(bytes, mime, file_name, max_unpacked_bytes) -> text` or an
//! `ExtractionError`.
//! The MIME type decides the extractor; a missing or generic MIME type falls back
//! to the file extension.

mod docx;

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::debug;

pub use docx::DocxExtractor;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File could not be read: {0}")]
    CorruptFile(String),

    #[error("File unpacks to more than {limit} bytes")]
    Oversized { limit: u64 },
}

/// A single file-format backend.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::CorruptFile(format!("invalid PDF: {e}"))),
            Err(_) => Err(ExtractionError::CorruptFile(
                "PDF structure could not be parsed".to_string(),
            )),
        }
    }
}

pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ExtractionError::CorruptFile("text file is not valid UTF-8".to_string()))
    }
}

/// Picks the extractor for a MIME type, using the file extension when the MIME
/// type is absent or generic. `max_unpacked_bytes` bounds archive formats.
pub fn extractor_for(
    mime: Option<&str>,
    file_name: Option<&str>,
    max_unpacked_bytes: usize,
) -> Result<Box<dyn DocumentExtractor>, ExtractionError> {
    let essence = mime
        .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != "application/octet-stream");

    let format = match essence.as_deref() {
        Some(MIME_PDF) => Format::Pdf,
        Some(MIME_DOCX) => Format::Docx,
        Some(MIME_TEXT) | Some(MIME_MARKDOWN) => Format::Text,
        Some(other) => return Err(ExtractionError::UnsupportedFormat(other.to_string())),
        None => format_from_extension(file_name)?,
    };

    Ok(match format {
        Format::Pdf => Box::new(PdfExtractor),
        Format::Docx => Box::new(DocxExtractor::new(max_unpacked_bytes)),
        Format::Text => Box::new(PlainTextExtractor),
    })
}

/// Extracts plain text from an uploaded document.
pub fn extract_text(
    bytes: &[u8],
    mime: Option<&str>,
    file_name: Option<&str>,
    max_unpacked_bytes: usize,
) -> Result<String, ExtractionError> {
    let extractor = extractor_for(mime, file_name, max_unpacked_bytes)?;
    let text = extractor.extract(bytes)?;
    debug!(
        "Extracted {} chars from {} byte upload",
        text.chars().count(),
        bytes.len()
    );
    Ok(text)
}

enum Format {
    Pdf,
    Docx,
    Text,
}

fn format_from_extension(file_name: Option<&str>) -> Result<Format, ExtractionError> {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => Ok(Format::Pdf),
        Some("docx") => Ok(Format::Docx),
        Some("txt") | Some("md") => Ok(Format::Text),
        Some(other) => Err(ExtractionError::UnsupportedFormat(format!(".{other}"))),
        None => Err(ExtractionError::UnsupportedFormat(
            "unknown (no content type or file extension)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: usize = 1024 * 1024;

    #[test]
    fn test_plain_text_round_trips_utf8() {
        let text = extract_text("Senior engineer — Python".as_bytes(), Some("text/plain"), None, BUDGET)
            .unwrap();
        assert_eq!(text, "Senior engineer — Python");
    }

    #[test]
    fn test_plain_text_strips_bom() {
        let text = extract_text(b"\xEF\xBB\xBFhello", Some("text/plain; charset=utf-8"), None, BUDGET)
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let err = extract_text(&[0xff, 0xfe, 0x00], Some(MIME_TEXT), None, BUDGET).unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptFile(_)));
    }

    #[test]
    fn test_unsupported_mime_is_rejected() {
        let err = extract_text(b"GIF89a", Some("image/gif"), Some("resume.gif"), BUDGET).unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedFormat("image/gif".to_string()));
    }

    #[test]
    fn test_octet_stream_falls_back_to_extension() {
        let text = extract_text(b"plain words", Some("application/octet-stream"), Some("cv.TXT"), BUDGET)
            .unwrap();
        assert_eq!(text, "plain words");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = extract_text(b"data", None, Some("resume.pages"), BUDGET).unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedFormat(".pages".to_string()));
    }

    #[test]
    fn test_missing_mime_and_name_is_rejected() {
        assert!(matches!(
            extract_text(b"data", None, None, BUDGET),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_garbage_pdf_is_corrupt_not_panic() {
        let err = extract_text(b"%PDF-1.7 this is not really a pdf", Some(MIME_PDF), None, BUDGET)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptFile(_)));
    }
}
