//! Importance and proficiency heuristics.
//!
//! Job side: how strongly a skill is asked for (`Importance`) and the level the
//! role expects. Résumé side: how much evidence the candidate shows. Both read
//! emphasis cues, seniority and stated years of experience.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::normalizer::{find_words, NormalizedText};
use crate::models::analysis::{Importance, Skill};

const LOW_CUES: &[&str] = &[
    "nice to have",
    "nice-to-have",
    "a plus",
    "bonus",
    "optional",
    "not required",
];
const MEDIUM_CUES: &[&str] = &["preferred", "desired", "ideally", "should have", "familiarity"];
const HIGH_CUES: &[&str] = &[
    "required",
    "requires",
    "require",
    "requirements",
    "must",
    "essential",
    "mandatory",
    "critical",
    "need",
    "needs",
];

/// Header prefixes longer than this are prose, not section headers.
const HEADER_MAX_WORDS: usize = 6;
const FREQUENT_MENTIONS: usize = 3;

/// Years phrases attach to skills this far after them (bytes)...
const YEARS_LOOKAHEAD: usize = 60;
/// ...or this far before them.
const YEARS_LOOKBEHIND: usize = 30;

const SENIORITY_BONUS: f32 = 0.1;

static YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("valid regex")
});

/// What the job asks of one skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobRequirement {
    pub importance: Importance,
    pub required_level: f32,
    pub years: Option<u32>,
}

/// What the résumé shows for one skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResumeEvidence {
    pub level: f32,
    pub years: Option<u32>,
}

pub fn assess_requirement(skill: &Skill, job: &NormalizedText) -> JobRequirement {
    let lower = job.text.to_ascii_lowercase();
    let title_len = job.title_len();

    let importance = skill
        .mentions
        .iter()
        .map(|&offset| {
            clause_importance(&lower, offset)
                .or_else(|| header_importance(&lower, offset))
                .unwrap_or(if offset < title_len || skill.mentions.len() >= FREQUENT_MENTIONS {
                    Importance::High
                } else {
                    Importance::Medium
                })
        })
        .max()
        .unwrap_or(Importance::Medium);

    let years = stated_years(&job.text, &skill.mentions);
    let seniority_bonus = if job.context.seniority.is_some_and(|s| s.is_senior_or_above()) {
        SENIORITY_BONUS
    } else {
        0.0
    };
    let from_importance = importance.base_level() + seniority_bonus;
    let from_years = years.map(years_to_level).unwrap_or(0.0);

    JobRequirement {
        importance,
        required_level: round2(from_importance.max(from_years).min(1.0)),
        years,
    }
}

pub fn assess_evidence(skill: &Skill, resume: &NormalizedText) -> ResumeEvidence {
    let repeat_bonus = (0.05 * skill.mentions.len().saturating_sub(1) as f32).min(0.2);
    let seniority_bonus = if resume.context.seniority.is_some_and(|s| s.is_senior_or_above()) {
        SENIORITY_BONUS
    } else {
        0.0
    };
    let years = stated_years(&resume.text, &skill.mentions);
    let from_mentions = 0.5 + repeat_bonus + seniority_bonus;
    let from_years = years.map(years_to_level).unwrap_or(0.0);

    ResumeEvidence {
        level: round2(from_mentions.max(from_years).clamp(0.1, 1.0)),
        years,
    }
}

/// 0.2 + 0.1 per year, saturating at 1.0 for eight or more years.
pub fn years_to_level(years: u32) -> f32 {
    (0.2 + 0.1 * years as f32).min(1.0)
}

pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Emphasis from the cue nearest to `offset`, looking first in its comma
/// segment and then in the whole clause.
fn clause_importance(lower: &str, offset: usize) -> Option<Importance> {
    [Boundary::Segment, Boundary::Clause]
        .into_iter()
        .find_map(|boundary| nearest_cue(lower, offset, boundary))
}

fn nearest_cue(lower: &str, offset: usize, boundary: Boundary) -> Option<Importance> {
    let (start, end) = enclosing(lower, offset, boundary);
    let clause = &lower[start..end];
    let local = offset - start;

    cue_spans(clause)
        .into_iter()
        .min_by_key(|&(cue_start, cue_end, importance)| {
            let distance = if cue_end <= local {
                local - cue_end
            } else {
                cue_start.saturating_sub(local)
            };
            // Nearest wins; on a tie prefer the stronger cue.
            (distance, std::cmp::Reverse(importance))
        })
        .map(|(_, _, importance)| importance)
}

/// Emphasis inherited from the latest "Header:" line above `offset`.
fn header_importance(lower: &str, offset: usize) -> Option<Importance> {
    let mut current = None;
    let mut line_start = 0;
    for line in lower.split('\n') {
        if line_start + line.len() >= offset {
            break;
        }
        if let Some((prefix, _)) = line.split_once(':') {
            if prefix.split_whitespace().count() <= HEADER_MAX_WORDS {
                current = strongest_cue(prefix);
            }
        }
        line_start += line.len() + 1;
    }
    current
}

fn strongest_cue(text: &str) -> Option<Importance> {
    cue_spans(text).into_iter().map(|(_, _, importance)| importance).max()
}

/// Cue occurrences in `text`. Weaker cues are claimed first so "not required"
/// is never also read as "required".
fn cue_spans(text: &str) -> Vec<(usize, usize, Importance)> {
    let mut spans: Vec<(usize, usize, Importance)> = Vec::new();
    for (cues, importance) in [
        (LOW_CUES, Importance::Low),
        (MEDIUM_CUES, Importance::Medium),
        (HIGH_CUES, Importance::High),
    ] {
        for cue in cues {
            for start in find_words(text, cue) {
                let end = start + cue.len();
                if spans.iter().all(|&(s, e, _)| end <= s || e <= start) {
                    spans.push((start, end, importance));
                }
            }
        }
    }
    spans
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Boundary {
    /// Clause further split on commas.
    Segment,
    Clause,
}

/// Byte range of the clause (or comma segment) containing `offset`. Clauses end
/// at `;`, `!`, `?`, line breaks, and at `.` followed by whitespace or end of
/// text (so "Node.js" stays whole).
fn enclosing(text: &str, offset: usize, boundary: Boundary) -> (usize, usize) {
    let bytes = text.as_bytes();
    let is_break = |i: usize| match bytes[i] {
        b';' | b'!' | b'?' | b'\n' => true,
        b',' => boundary == Boundary::Segment,
        b'.' => i + 1 >= bytes.len() || bytes[i + 1].is_ascii_whitespace(),
        _ => false,
    };

    let offset = offset.min(bytes.len());
    let start = (0..offset).rev().find(|&i| is_break(i)).map_or(0, |i| i + 1);
    let end = (offset..bytes.len()).find(|&i| is_break(i)).unwrap_or(bytes.len());
    (start, end)
}

/// Largest years figure stated near any mention, in the same clause.
fn stated_years(text: &str, mentions: &[usize]) -> Option<u32> {
    YEARS
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let years: u32 = caps.get(1)?.as_str().parse().ok()?;
            let attached = mentions.iter().any(|&mention| {
                let (start, end) = enclosing(text, mention, Boundary::Clause);
                if whole.start() < start || whole.end() > end {
                    return false;
                }
                if mention >= whole.end() {
                    mention - whole.end() <= YEARS_LOOKAHEAD
                } else {
                    whole.start().saturating_sub(mention) <= YEARS_LOOKBEHIND
                }
            });
            attached.then_some(years)
        })
        .max()
}
