//! Skill Extractor — finds skill mentions in normalized text.
//!
//! Two passes:
//! 1. Lexical: vocabulary hits (high confidence, grows with repeated mentions).
//! 2. Contextual: skills the vocabulary does not know, picked up from mixed-case
//!    technology tokens ("LangChain") and capitalized phrases after cues such as
//!    "experience with". Contextual confidence is capped below any lexical hit.
//!
//! Results are deduplicated by `SkillKey` and ordered by first mention.
//! Capitalized names in employer position ("at PayPal", "our Stripe teams") are
//! organisations, not skills. In a job description, a practice named only in
//! the title ("Backend Engineer") describes the role rather than a requirement.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::analysis::normalizer::{DocumentRole, NormalizedText};
use crate::analysis::vocabulary::{SkillVocabulary, PRACTICES};
use crate::models::analysis::{Skill, SkillKey};

const LEXICAL_BASE: f32 = 0.9;
const LEXICAL_STEP: f32 = 0.025;
const CONTEXTUAL_BASE: f32 = 0.55;
const CONTEXTUAL_STEP: f32 = 0.05;
const CONTEXTUAL_CAP: f32 = 0.75;

static MIXED_CASE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z][A-Za-z0-9]{3,}\b").expect("valid regex"));

static CUE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?i:experience (?:with|in)|proficien(?:t|cy) (?:in|with)|knowledge of|familiar(?:ity)? with|expertise in|skilled in|worked with|hands-on with)) ([A-Z][A-Za-z0-9.+#/-]*(?: [A-Z][A-Za-z0-9.+#/-]*){0,2})",
    )
    .expect("valid regex")
});

/// Common words that show up capitalized after cue phrases but are not skills.
const EXCLUDED_WORDS: &[&str] = &[
    "we", "you", "our", "your", "the", "and", "for", "with", "from", "this", "that", "have",
    "has", "been", "are", "is", "will", "would", "should", "can", "could", "may", "must",
    "about", "into", "other", "some", "such", "only", "key", "role", "team", "work",
    "company", "remote", "type", "required", "preferred", "strong", "knowledge", "experience",
    "proficiency", "understanding", "ability", "skills", "qualifications", "responsibilities",
    "solid", "latest", "location", "salary", "benefits", "resume", "profile", "links",
    "engineer", "developer", "scientist", "analyst", "manager", "corp", "inc", "ltd", "llc",
    "design", "build", "solutions", "products", "frameworks", "algorithms", "models",
    "pipelines", "platforms", "tools", "technologies", "projects", "environment", "hardware",
    "databases", "apis", "big", "data", "statistics", "mathematics", "computer", "science",
    "phd", "master", "bachelor", "degree", "linkedin", "senior", "junior", "modern", "large",
];

/// A capitalized name right after one of these is an employer.
const EMPLOYER_LEADS: &[&str] = &["at", "@", "joined"];

/// Words that turn the name before them into an organisation.
const EMPLOYER_TRAILS: &[&str] = &[
    "team", "teams", "inc", "corp", "ltd", "llc", "gmbh", "group", "office", "offices",
];

/// Joiners that carry employer position along a list: "at Stripe, Lyft and Uber".
const LIST_JOINERS: &[&str] = &["and", "&", "or"];

/// How far back a list of names may run before its lead word.
const MAX_LIST_WORDS: usize = 8;

/// Endings of words that read as activities or qualities rather than skills.
const NON_SKILL_SUFFIXES: &[&str] = &["ing", "ed", "ly", "tion", "ment", "ness", "ity", "ship"];

/// Extracts deduplicated skills from normalized text, ordered by first mention.
pub fn extract(text: &str, vocabulary: &SkillVocabulary) -> Vec<Skill> {
    let hits = vocabulary.scan(text);
    let lexical_spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.start, h.end)).collect();

    let mut found: BTreeMap<SkillKey, Skill> = BTreeMap::new();
    for hit in &hits {
        let definition = vocabulary.definition(hit.definition);
        found
            .entry(definition.key())
            .or_insert_with(|| Skill {
                key: definition.key(),
                name: definition.name.clone(),
                confidence: 0.0,
                category: Some(definition.category.clone()),
                mentions: Vec::new(),
            })
            .mentions
            .push(hit.start);
    }
    for skill in found.values_mut() {
        skill.confidence = lexical_confidence(skill.mentions.len());
    }

    let mut contextual: BTreeMap<SkillKey, Skill> = BTreeMap::new();
    for (start, name) in contextual_candidates(text, &lexical_spans) {
        let key = vocabulary.resolve(&name);
        let definition = vocabulary.lookup(&key);
        let skill = contextual.entry(key.clone()).or_insert_with(|| Skill {
            key,
            name: definition.map(|d| d.name.clone()).unwrap_or(name),
            confidence: 0.0,
            category: definition.map(|d| d.category.clone()),
            mentions: Vec::new(),
        });
        skill.mentions.push(start);
    }

    for (key, mut skill) in contextual {
        skill.mentions.sort_unstable();
        skill.mentions.dedup();
        skill.confidence = contextual_confidence(skill.mentions.len());

        match found.entry(key) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                existing.confidence = existing.confidence.max(skill.confidence);
                existing.mentions.extend(skill.mentions);
                existing.mentions.sort_unstable();
                existing.mentions.dedup();
            }
            Entry::Vacant(slot) => {
                slot.insert(skill);
            }
        }
    }

    let mut skills: Vec<Skill> = found.into_values().collect();
    skills.sort_by(|a, b| {
        a.position()
            .cmp(&b.position())
            .then_with(|| a.key.cmp(&b.key))
    });
    skills
}

/// `extract` over a normalized document.
pub fn extract_document(document: &NormalizedText, vocabulary: &SkillVocabulary) -> Vec<Skill> {
    let mut skills = extract(&document.text, vocabulary);
    // A single-line posting has no separate title to discount.
    if document.role == DocumentRole::JobDescription && document.text.contains('\n') {
        let title_len = document.title_len();
        skills.retain(|skill| !is_title_only_practice(skill, title_len));
    }
    debug!(role = %document.role, skills = skills.len(), "Extracted skills");
    skills
}

fn is_title_only_practice(skill: &Skill, title_len: usize) -> bool {
    skill.category.as_deref() == Some(PRACTICES)
        && skill.mentions.iter().all(|&offset| offset < title_len)
}

fn lexical_confidence(mentions: usize) -> f32 {
    (LEXICAL_BASE + LEXICAL_STEP * mentions.saturating_sub(1) as f32).min(1.0)
}

fn contextual_confidence(mentions: usize) -> f32 {
    (CONTEXTUAL_BASE + CONTEXTUAL_STEP * mentions.saturating_sub(1) as f32).min(CONTEXTUAL_CAP)
}

/// Candidate (offset, name) pairs not already covered by a vocabulary hit.
fn contextual_candidates(text: &str, lexical_spans: &[(usize, usize)]) -> Vec<(usize, String)> {
    let mut candidates = Vec::new();
    let mut phrase_spans = Vec::new();

    for caps in CUE_PHRASE.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        let Some(phrase) = clean_phrase(m.as_str()) else {
            continue;
        };
        let end = m.start() + phrase.len();
        if overlaps(lexical_spans, m.start(), end) {
            continue;
        }
        phrase_spans.push((m.start(), end));
        candidates.push((m.start(), phrase));
    }

    for m in MIXED_CASE_TOKEN.find_iter(text) {
        let token = m.as_str();
        if !is_mixed_case(token)
            || overlaps(lexical_spans, m.start(), m.end())
            || overlaps(&phrase_spans, m.start(), m.end())
            || !is_plausible_word(token)
            || is_employer(text, m.start(), m.end())
        {
            continue;
        }
        candidates.push((m.start(), token.to_string()));
    }

    candidates
}

/// Keeps the leading run of plausible words and trims trailing punctuation.
fn clean_phrase(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split(' ')
        .map(|w| w.trim_end_matches(['.', '-', '/']))
        .take_while(|w| !w.is_empty() && !is_excluded(w))
        .collect();

    match words.as_slice() {
        [] => None,
        [single] if !is_plausible_word(single) => None,
        _ => Some(words.join(" ")),
    }
}

fn is_excluded(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    EXCLUDED_WORDS.contains(&lower.as_str())
}

fn is_plausible_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    lower.len() >= 2
        && lower.chars().any(|c| c.is_ascii_alphabetic())
        && !EXCLUDED_WORDS.contains(&lower.as_str())
        && !NON_SKILL_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// "LangChain", "PostGIS": an uppercase letter after the first character plus
/// at least one lowercase letter.
fn is_mixed_case(token: &str) -> bool {
    token.chars().skip(1).any(|c| c.is_ascii_uppercase())
        && token.chars().any(|c| c.is_ascii_lowercase())
}

/// True when the name at `start..end` reads as an organisation: led by
/// "at"/"joined" (possibly across a list of names) or followed by "teams", "Inc".
fn is_employer(text: &str, start: usize, end: usize) -> bool {
    let before = &text[..start];
    if before.ends_with('@') {
        return true;
    }

    let next = text[end..]
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_ascii_lowercase());
    if next.is_some_and(|w| EMPLOYER_TRAILS.contains(&w.as_str())) {
        return true;
    }

    for word in before.split_whitespace().rev().take(MAX_LIST_WORDS) {
        let lower = word.to_ascii_lowercase();
        if EMPLOYER_LEADS.contains(&lower.as_str()) {
            return true;
        }
        // A sentence or clause boundary ends the list.
        if word.ends_with(['.', ';', ':', '!', '?']) {
            return false;
        }
        let bare = word.trim_end_matches(',');
        let is_name = bare.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if !is_name && !LIST_JOINERS.contains(&bare.to_ascii_lowercase().as_str()) {
            return false;
        }
    }
    false
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}
