use std::io::{self, Cursor, Read};
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use super::{DocumentExtractor, ExtractionError};

const DOCUMENT_PART: &str = "word/document.xml";

/// Parses a DOCX package with `docx-rs` and keeps the paragraph text, one line
/// per paragraph.
///
/// Every part of the archive is inflated into a sink first and counted against
/// `max_unpacked_bytes`, so a small upload cannot expand into gigabytes.
pub struct DocxExtractor {
    max_unpacked_bytes: u64,
}

impl DocxExtractor {
    pub fn new(max_unpacked_bytes: usize) -> Self {
        Self {
            max_unpacked_bytes: max_unpacked_bytes as u64,
        }
    }
}

impl DocumentExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        check_unpacked_size(bytes, self.max_unpacked_bytes)?;

        // docx-rs unwraps internally on some malformed packages.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            docx_rs::read_docx(bytes).map(|docx| docx.json())
        }));
        let json = match outcome {
            Ok(Ok(json)) => json,
            Ok(Err(e)) => {
                return Err(ExtractionError::CorruptFile(format!("invalid DOCX: {e:?}")))
            }
            Err(_) => {
                return Err(ExtractionError::CorruptFile(
                    "DOCX structure could not be parsed".to_string(),
                ))
            }
        };

        let parsed: Value = serde_json::from_str(&json)
            .map_err(|e| ExtractionError::CorruptFile(format!("unreadable DOCX body: {e}")))?;

        let mut text = String::new();
        collect_text(&parsed["document"], None, &mut text);
        Ok(tidy(&text))
    }
}

fn check_unpacked_size(bytes: &[u8], budget: u64) -> Result<(), ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::CorruptFile(format!("invalid DOCX archive: {e}")))?;

    if !archive.file_names().any(|name| name == DOCUMENT_PART) {
        return Err(ExtractionError::CorruptFile(format!(
            "DOCX is missing {DOCUMENT_PART}"
        )));
    }

    let mut remaining = budget;
    for idx in 0..archive.len() {
        let part = archive
            .by_index(idx)
            .map_err(|e| ExtractionError::CorruptFile(format!("unreadable DOCX part: {e}")))?;
        // Declared sizes can lie; count what actually inflates.
        let inflated = io::copy(&mut part.take(remaining + 1), &mut io::sink())
            .map_err(|e| ExtractionError::CorruptFile(format!("unreadable DOCX part: {e}")))?;
        if inflated > remaining {
            return Err(ExtractionError::Oversized { limit: budget });
        }
        remaining -= inflated;
    }
    Ok(())
}

/// Walks the docx-rs JSON tree in document order. Nodes are recognised by
/// their `type` tag, or by the key they sit under.
fn collect_text(node: &Value, hint: Option<&str>, out: &mut String) {
    match node {
        Value::Array(items) => {
            for item in items {
                collect_text(item, None, out);
            }
        }
        Value::Object(map) => {
            let kind = map
                .get("type")
                .and_then(Value::as_str)
                .or(hint)
                .map(str::to_ascii_lowercase);

            match kind.as_deref() {
                Some("text") => {
                    let text = map
                        .get("text")
                        .and_then(Value::as_str)
                        .or_else(|| map.get("data")?.get("text")?.as_str());
                    if let Some(text) = text {
                        out.push_str(text);
                    }
                    return;
                }
                Some("tab") => {
                    out.push('\t');
                    return;
                }
                Some("break") => {
                    out.push('\n');
                    return;
                }
                _ => {}
            }

            for (key, value) in map {
                collect_text(value, Some(key.as_str()), out);
            }
            if kind.as_deref() == Some("paragraph") {
                out.push('\n');
            }
        }
        _ => {}
    }
}

fn tidy(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
