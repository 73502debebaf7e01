//! Text Normalizer — cleans raw résumé / job text and rejects input that is
//! empty, too short, or over the size ceiling. Also picks up role-level cues
//! (title line, seniority language) used later by scoring and planning.
//!
//! Output text keeps one line per non-empty input line with horizontal
//! whitespace collapsed, so later stages can reason about headers and clauses.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::InputLimits;

/// Which side of the comparison a text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    Resume,
    JobDescription,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Resume => f.write_str("Resume"),
            DocumentRole::JobDescription => f.write_str("Job description"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("{role} is empty")]
    Empty { role: DocumentRole },

    #[error("{role} is too short: {words} words (minimum {minimum})")]
    TooShort {
        role: DocumentRole,
        words: usize,
        minimum: usize,
    },

    #[error("{role} is too long: {chars} characters (maximum {maximum})")]
    TooLong {
        role: DocumentRole,
        chars: usize,
        maximum: usize,
    },
}

/// Seniority ladder. Ordering is meaningful: `Entry < Mid < Senior < Lead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Entry,
    Mid,
    Senior,
    Lead,
}

impl Seniority {
    pub fn is_senior_or_above(self) -> bool {
        self >= Seniority::Senior
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleContext {
    /// First line, when short enough to read as a title.
    pub title: Option<String>,
    pub seniority: Option<Seniority>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedText {
    pub role: DocumentRole,
    pub text: String,
    pub word_count: usize,
    pub context: RoleContext,
}

impl NormalizedText {
    /// Byte length of the title line within `text` (0 when there is no title).
    pub fn title_len(&self) -> usize {
        self.context.title.as_ref().map(|t| t.len()).unwrap_or(0)
    }
}

const TITLE_MAX_WORDS: usize = 12;

/// Longest-phrase-first so "senior staff" style titles resolve to the top rung present.
const SENIORITY_CUES: &[(&str, Seniority)] = &[
    ("head of", Seniority::Lead),
    ("principal", Seniority::Lead),
    ("lead", Seniority::Lead),
    ("staff", Seniority::Senior),
    ("senior", Seniority::Senior),
    ("sr.", Seniority::Senior),
    ("sr", Seniority::Senior),
    ("mid-level", Seniority::Mid),
    ("mid level", Seniority::Mid),
    ("intermediate", Seniority::Mid),
    ("entry-level", Seniority::Entry),
    ("entry level", Seniority::Entry),
    ("junior", Seniority::Entry),
    ("jr.", Seniority::Entry),
    ("graduate", Seniority::Entry),
    ("intern", Seniority::Entry),
];

/// Cleans `raw` and enforces the word-count minimum for `role`.
pub fn normalize(
    raw: &str,
    role: DocumentRole,
    limits: &InputLimits,
) -> Result<NormalizedText, NormalizeError> {
    let chars = raw.chars().count();
    if chars > limits.max_text_chars {
        return Err(NormalizeError::TooLong {
            role,
            chars,
            maximum: limits.max_text_chars,
        });
    }

    let text = clean(raw);
    let word_count = count_words(&text);
    if word_count == 0 {
        return Err(NormalizeError::Empty { role });
    }

    let minimum = match role {
        DocumentRole::Resume => limits.resume_min_words,
        DocumentRole::JobDescription => limits.job_min_words,
    };
    if word_count < minimum {
        return Err(NormalizeError::TooShort {
            role,
            words: word_count,
            minimum,
        });
    }

    let context = detect_role_context(&text);

    Ok(NormalizedText {
        role,
        text,
        word_count,
        context,
    })
}

fn clean(raw: &str) -> String {
    let mut lines = Vec::new();
    for line in raw.split(['\n', '\r']) {
        let mut cleaned = String::with_capacity(line.len());
        let mut pending_space = false;
        for ch in line.chars() {
            if is_invisible(ch) {
                continue;
            }
            if ch.is_whitespace() || ch.is_control() {
                pending_space = !cleaned.is_empty();
                continue;
            }
            if pending_space {
                cleaned.push(' ');
                pending_space = false;
            }
            cleaned.push(ch);
        }
        if !cleaned.is_empty() {
            lines.push(cleaned);
        }
    }
    lines.join("\n")
}

fn is_invisible(ch: char) -> bool {
    matches!(ch, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{FFFD}')
}

/// Counts tokens that carry at least one letter or digit.
fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

fn detect_role_context(text: &str) -> RoleContext {
    let title = text
        .lines()
        .next()
        .filter(|line| line.split_whitespace().count() <= TITLE_MAX_WORDS)
        .map(str::to_string);

    // Title cues are authoritative; body cues only fill in when the title is silent.
    let seniority = title
        .as_deref()
        .and_then(seniority_in)
        .or_else(|| seniority_in(text));

    RoleContext { title, seniority }
}

fn seniority_in(text: &str) -> Option<Seniority> {
    let lower = text.to_ascii_lowercase();
    SENIORITY_CUES
        .iter()
        .filter(|(cue, _)| contains_word(&lower, cue))
        .map(|(_, level)| *level)
        .max()
}

/// Substring search that only accepts hits bounded by non-alphanumeric characters.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    find_words(haystack, needle).next().is_some()
}

/// Every bounded occurrence of `needle` in `haystack`, as byte offsets.
pub(crate) fn find_words<'a>(
    haystack: &'a str,
    needle: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    let bytes = haystack.as_bytes();
    haystack.match_indices(needle).filter_map(move |(start, m)| {
        let end = start + m.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
        (before_ok && after_ok).then_some(start)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(resume_min: usize, job_min: usize) -> InputLimits {
        InputLimits {
            resume_min_words: resume_min,
            job_min_words: job_min,
            ..InputLimits::default()
        }
    }

    #[test]
    fn test_collapses_whitespace_and_drops_blank_lines() {
        let raw = "  Senior   Engineer \r\n\r\n\tPython,\u{00A0}Docker\u{200B}  \n\n\n";
        let normalized = normalize(raw, DocumentRole::Resume, &limits(1, 1)).unwrap();
        assert_eq!(normalized.text, "Senior Engineer\nPython, Docker");
        assert_eq!(normalized.word_count, 4);
    }

    #[test]
    fn test_control_characters_become_spaces() {
        let raw = "Rust\u{0007}and\u{0000}Go";
        let normalized = normalize(raw, DocumentRole::Resume, &limits(1, 1)).unwrap();
        assert_eq!(normalized.text, "Rust and Go");
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = normalize(" \n\t ", DocumentRole::JobDescription, &limits(1, 1)).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::Empty {
                role: DocumentRole::JobDescription
            }
        );
    }

    #[test]
    fn test_job_description_below_minimum_is_rejected() {
        let err = normalize(
            "Requires: Python, Kubernetes, Docker",
            DocumentRole::JobDescription,
            &InputLimits::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::TooShort {
                role: DocumentRole::JobDescription,
                words: 4,
                minimum: 30
            }
        );
    }

    #[test]
    fn test_resume_uses_resume_minimum() {
        let text = "word ".repeat(40);
        assert!(normalize(&text, DocumentRole::JobDescription, &InputLimits::default()).is_ok());
        assert!(matches!(
            normalize(&text, DocumentRole::Resume, &InputLimits::default()),
            Err(NormalizeError::TooShort { minimum: 50, .. })
        ));
    }

    #[test]
    fn test_punctuation_only_tokens_do_not_count() {
        let normalized = normalize("Python - Docker |", DocumentRole::Resume, &limits(1, 1)).unwrap();
        assert_eq!(normalized.word_count, 2);
    }

    #[test]
    fn test_oversized_input_fails_fast() {
        let limits = InputLimits {
            max_text_chars: 10,
            ..limits(1, 1)
        };
        let err = normalize("this is definitely too long", DocumentRole::Resume, &limits)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::TooLong { maximum: 10, .. }));
    }

    #[test]
    fn test_title_seniority_wins_over_body() {
        let raw = "Senior Backend Engineer\nYou will mentor junior developers.";
        let normalized = normalize(raw, DocumentRole::JobDescription, &limits(1, 1)).unwrap();
        assert_eq!(normalized.context.title.as_deref(), Some("Senior Backend Engineer"));
        assert_eq!(normalized.context.seniority, Some(Seniority::Senior));
    }

    #[test]
    fn test_body_seniority_used_when_title_silent() {
        let raw = "Backend Engineer\nThis is an entry-level position.";
        let normalized = normalize(raw, DocumentRole::JobDescription, &limits(1, 1)).unwrap();
        assert_eq!(normalized.context.seniority, Some(Seniority::Entry));
    }

    #[test]
    fn test_seniority_cue_requires_word_boundary() {
        // "leadership" and "internal" must not read as lead / intern.
        let raw = "Engineer\nStrong leadership on internal tooling.";
        let normalized = normalize(raw, DocumentRole::Resume, &limits(1, 1)).unwrap();
        assert_eq!(normalized.context.seniority, None);
    }

    #[test]
    fn test_long_first_line_is_not_a_title() {
        let raw = "We are looking for someone who enjoys building reliable systems at scale every day";
        let normalized = normalize(raw, DocumentRole::JobDescription, &limits(1, 1)).unwrap();
        assert!(normalized.context.title.is_none());
        assert_eq!(normalized.title_len(), 0);
    }

    #[test]
    fn test_find_words_respects_boundaries() {
        let hits: Vec<_> = find_words("go golang go-to ago go", "go").collect();
        assert_eq!(hits, vec![0, 10, 20]);
    }
}
