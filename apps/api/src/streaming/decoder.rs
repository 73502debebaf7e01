#![allow(dead_code)]

//! Stream Consumer — incremental decoder for the progress stream plus the view
//! state a client renders from it.
//!
//! Transport chunks carry no framing guarantees: a record, its `data:` prefix or
//! a multi-byte character may be split across reads. The decoder buffers raw
//! bytes, only decodes complete lines, and keeps the remainder for the next
//! chunk, up to a per-line ceiling. Plain JSON lines (no `data:` prefix) are
//! accepted as well. A failure part-way through a chunk still hands back the
//! records decoded before it.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use thiserror::Error;

use super::StreamRecord;
use crate::models::analysis::AnalysisResult;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("Stream contained invalid UTF-8")]
    InvalidUtf8,

    #[error("Unrecognized stream payload: {0}")]
    InvalidPayload(String),

    #[error("Progress went backwards from {from} to {to}")]
    ProgressRegressed { from: u8, to: u8 },

    #[error("Record received after the stream had ended")]
    RecordAfterTerminal,

    #[error("Stream ended without a result or error")]
    Truncated,

    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Stream line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// A decode error plus the records the same chunk completed before it.
#[derive(Debug, Error, PartialEq)]
#[error("{error}")]
pub struct DecodeFailure {
    pub decoded: Vec<StreamRecord>,
    pub error: DecodeError,
}

/// Largest single line (one serialized record) the decoder will buffer.
pub const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline.
    scanned: usize,
    max_line_bytes: usize,
    last_progress: Option<u8>,
    terminated: bool,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::with_max_line_bytes(MAX_LINE_BYTES)
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line_bytes,
            last_progress: None,
            terminated: false,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Consumes one transport chunk and returns every record it completed. On
    /// failure the records decoded ahead of the bad line travel with the error.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<StreamRecord>, DecodeFailure> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
                self.scanned = self.buffer.len();
                break;
            };
            let newline = self.scanned + offset;
            self.scanned = 0;
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();

            let decoded = if newline > self.max_line_bytes {
                Err(DecodeError::LineTooLong {
                    limit: self.max_line_bytes,
                })
            } else {
                self.decode_line(&line[..newline])
            };
            match decoded {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(error) => {
                    return Err(DecodeFailure {
                        decoded: records,
                        error,
                    })
                }
            }
        }

        if self.buffer.len() > self.max_line_bytes {
            self.buffer.clear();
            self.scanned = 0;
            return Err(DecodeFailure {
                decoded: records,
                error: DecodeError::LineTooLong {
                    limit: self.max_line_bytes,
                },
            });
        }
        Ok(records)
    }

    /// Flushes a final unterminated line and checks the stream ended properly.
    pub fn finish(&mut self) -> Result<Vec<StreamRecord>, DecodeError> {
        let mut records = Vec::new();
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.scanned = 0;
            if let Some(record) = self.decode_line(&line)? {
                records.push(record);
            }
        }
        if !self.terminated {
            return Err(DecodeError::Truncated);
        }
        Ok(records)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Result<Option<StreamRecord>, DecodeError> {
        let line = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
        let line = line.strip_suffix('\r').unwrap_or(line);

        let payload = if let Some(data) = line.strip_prefix("data:") {
            data.strip_prefix(' ').unwrap_or(data)
        } else if line.trim_start().starts_with('{') {
            line
        } else {
            // Blank separators, `:` keep-alive comments, `event:`/`id:` fields.
            return Ok(None);
        };
        if payload.trim().is_empty() {
            return Ok(None);
        }

        let record: StreamRecord = serde_json::from_str(payload)
            .map_err(|_| DecodeError::InvalidPayload(truncate(payload, 120)))?;
        self.check_order(&record)?;
        Ok(Some(record))
    }

    fn check_order(&mut self, record: &StreamRecord) -> Result<(), DecodeError> {
        if self.terminated {
            return Err(DecodeError::RecordAfterTerminal);
        }
        if record.is_terminal() {
            self.terminated = true;
        }
        if let StreamRecord::Progress(update) = record {
            if update.progress > 100 {
                return Err(DecodeError::InvalidPayload(format!(
                    "progress {} out of range",
                    update.progress
                )));
            }
            if let Some(last) = self.last_progress {
                if update.progress < last {
                    return Err(DecodeError::ProgressRegressed {
                        from: last,
                        to: update.progress,
                    });
                }
            }
            self.last_progress = Some(update.progress);
        }
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// What a client shows while an analysis streams in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisView {
    pub phase: Phase,
    pub progress: u8,
    pub message: String,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl AnalysisView {
    pub fn apply(&mut self, record: StreamRecord) {
        match record {
            StreamRecord::Progress(update) => {
                self.phase = Phase::Running;
                self.progress = update.progress;
                self.message = update.message;
            }
            StreamRecord::Error(payload) => self.fail(payload.error),
            StreamRecord::Result(payload) => {
                self.phase = Phase::Completed;
                self.progress = 100;
                self.result = Some(*payload.result);
            }
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = Phase::Failed;
        self.error = Some(message.into());
    }
}

/// Drives a byte stream to completion, calling `on_update` after every record.
/// Records decoded ahead of a failure are applied first. Decode and transport
/// failures then mark the view failed, unless it already reached a terminal
/// record.
pub async fn consume_stream<S, B, E, F>(stream: S, mut on_update: F) -> Result<AnalysisView, DecodeError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    F: FnMut(&AnalysisView),
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = StreamDecoder::new();
    let mut view = AnalysisView::default();

    let outcome: Result<(), DecodeError> = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DecodeError::Transport(e.to_string()))?;
            let (records, failure) = match decoder.feed(chunk.as_ref()) {
                Ok(records) => (records, None),
                Err(DecodeFailure { decoded, error }) => (decoded, Some(error)),
            };
            for record in records {
                view.apply(record);
                on_update(&view);
            }
            if let Some(error) = failure {
                return Err(error);
            }
        }
        for record in decoder.finish()? {
            view.apply(record);
            on_update(&view);
        }
        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => Ok(view),
        Err(e) => {
            if matches!(view.phase, Phase::Idle | Phase::Running) {
                view.fail(e.to_string());
                on_update(&view);
            }
            Err(e)
        }
    }
}
