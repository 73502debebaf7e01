use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized skill identity: trimmed, whitespace-collapsed, ASCII-lowercased,
/// alias-resolved. Display names never take part in comparisons.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillKey(String);

impl SkillKey {
    /// Builds a key from a raw name without alias resolution.
    /// Use `SkillVocabulary::resolve` when aliases matter.
    pub fn new(name: &str) -> Self {
        let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
        SkillKey(collapsed.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A skill mention extracted from normalized text.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub key: SkillKey,
    pub name: String,
    /// 0.0 – 1.0; lexical hits always outrank contextual guesses.
    pub confidence: f32,
    pub category: Option<String>,
    /// Byte offsets of every mention in the normalized text, ascending.
    pub mentions: Vec<usize>,
}

impl Skill {
    /// Offset of the first mention, used for job-description ordering.
    pub fn position(&self) -> usize {
        self.mentions.first().copied().unwrap_or(usize::MAX)
    }
}

/// How strongly the job text emphasizes a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    /// Baseline proficiency the job expects for a skill of this importance.
    pub fn base_level(self) -> f32 {
        match self {
            Importance::High => 0.8,
            Importance::Medium => 0.6,
            Importance::Low => 0.4,
        }
    }

    /// Weight used by the profile-fit coverage term.
    pub fn weight(self) -> f32 {
        match self {
            Importance::High => 3.0,
            Importance::Medium => 2.0,
            Importance::Low => 1.0,
        }
    }
}

/// Suggestion priority. Ordered so that sorting ascending puts `High` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn escalate(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium | Priority::High => Priority::High,
        }
    }
}

impl From<Importance> for Priority {
    fn from(importance: Importance) -> Self {
        match importance {
            Importance::High => Priority::High,
            Importance::Medium => Priority::Medium,
            Importance::Low => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSkill {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub skill: String,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakSkill {
    pub skill: String,
    pub current_level: f32,
    pub required_level: f32,
    /// Résumé skill the weak match was drawn from, when it differs from `skill`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_match: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Course,
    Tutorial,
    Documentation,
    Project,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub skill: String,
    pub priority: Priority,
    pub learning_path: Vec<String>,
    pub resources: Vec<LearningResource>,
    pub estimated_time: String,
}

/// Aggregate root of one analysis request. Built once, never mutated after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub profile_fit_score: f64,
    pub skill_match_percentage: f64,
    pub matched_skills: Vec<MatchedSkill>,
    pub missing_skills: Vec<MissingSkill>,
    #[serde(default)]
    pub weak_skills: Vec<WeakSkill>,
    pub improvement_suggestions: Vec<ImprovementSuggestion>,
    pub analysis_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_rewrite_suggestions: Option<String>,
    /// Résumé skills the job does not ask for. Informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_skills: Vec<String>,
}
