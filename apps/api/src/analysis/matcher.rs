//! Matcher — aligns résumé skills to job skills.
//!
//! Algorithm, per job skill in job-description order:
//! 1. Same `SkillKey` in the résumé → matched, unless both texts state years
//!    and the résumé's figure is lower (→ weak).
//! 2. Otherwise the most similar résumé skill by embedding cosine:
//!    - ≥ `thresholds.matched` → matched
//!    - ≥ `thresholds.weak`    → weak, `current = required × similarity × proficiency`
//!    - below                  → missing, carrying the job-side importance
//!
//! Résumé skills that no job skill drew on are reported as additional skills.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::analysis::embedding::{cosine, SkillEmbedder};
use crate::analysis::proficiency::{round2, years_to_level, JobRequirement, ResumeEvidence};
use crate::config::MatchThresholds;
use crate::errors::AppError;
use crate::models::analysis::{MatchedSkill, MissingSkill, Skill, SkillKey, WeakSkill};

/// A job skill with what the job asks of it.
#[derive(Debug, Clone)]
pub struct JobSkill {
    pub skill: Skill,
    pub requirement: JobRequirement,
}

/// A résumé skill with the evidence behind it.
#[derive(Debug, Clone)]
pub struct ResumeSkill {
    pub skill: Skill,
    pub evidence: ResumeEvidence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(MatchedSkill),
    Weak(WeakSkill),
    Missing(MissingSkill),
}

/// Classification of one job skill.
#[derive(Debug, Clone)]
pub struct SkillMatch {
    pub job: JobSkill,
    pub outcome: MatchOutcome,
}

impl SkillMatch {
    /// `required - current` for weak skills, the full requirement for missing
    /// ones, zero when matched.
    pub fn gap(&self) -> f32 {
        match &self.outcome {
            MatchOutcome::Matched(_) => 0.0,
            MatchOutcome::Weak(weak) => (weak.required_level - weak.current_level).max(0.0),
            MatchOutcome::Missing(_) => self.job.requirement.required_level,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    /// One entry per job skill, in job-description order.
    pub matches: Vec<SkillMatch>,
    /// Résumé skills the job does not ask for, in résumé order.
    pub additional_skills: Vec<String>,
}

impl MatchReport {
    pub fn matched(&self) -> Vec<MatchedSkill> {
        self.matches
            .iter()
            .filter_map(|m| match &m.outcome {
                MatchOutcome::Matched(skill) => Some(skill.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn weak(&self) -> Vec<WeakSkill> {
        self.matches
            .iter()
            .filter_map(|m| match &m.outcome {
                MatchOutcome::Weak(skill) => Some(skill.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn missing(&self) -> Vec<MissingSkill> {
        self.matches
            .iter()
            .filter_map(|m| match &m.outcome {
                MatchOutcome::Missing(skill) => Some(skill.clone()),
                _ => None,
            })
            .collect()
    }
}

pub async fn match_skills(
    job_skills: &[JobSkill],
    resume_skills: &[ResumeSkill],
    embedder: &dyn SkillEmbedder,
    thresholds: MatchThresholds,
) -> Result<MatchReport, AppError> {
    let resume_by_key: HashMap<&SkillKey, usize> = resume_skills
        .iter()
        .enumerate()
        .map(|(idx, r)| (&r.skill.key, idx))
        .collect();

    let unresolved: Vec<&JobSkill> = job_skills
        .iter()
        .filter(|j| !resume_by_key.contains_key(&j.skill.key))
        .collect();

    // Embed only when some job skill needs a semantic lookup.
    let (job_vectors, resume_vectors) = if unresolved.is_empty() || resume_skills.is_empty() {
        (HashMap::new(), Vec::new())
    } else {
        let keys: Vec<SkillKey> = unresolved
            .iter()
            .map(|j| j.skill.key.clone())
            .chain(resume_skills.iter().map(|r| r.skill.key.clone()))
            .collect();
        let mut vectors = embedder.embed_batch(&keys).await?;
        if vectors.len() != keys.len() {
            return Err(AppError::Analysis(format!(
                "Embedder returned {} vectors for {} skills",
                vectors.len(),
                keys.len()
            )));
        }
        let resume_vectors = vectors.split_off(unresolved.len());
        let job_vectors: HashMap<&SkillKey, Vec<f32>> = unresolved
            .iter()
            .map(|j| &j.skill.key)
            .zip(vectors)
            .collect();
        (job_vectors, resume_vectors)
    };

    let mut used: HashSet<usize> = HashSet::new();
    let mut matches = Vec::with_capacity(job_skills.len());

    for job in job_skills {
        let outcome = match resume_by_key.get(&job.skill.key) {
            Some(&idx) => {
                used.insert(idx);
                exact_outcome(job, &resume_skills[idx])
            }
            None => {
                let best = job_vectors
                    .get(&job.skill.key)
                    .and_then(|vector| best_match(vector, &resume_vectors));
                match best {
                    Some((idx, similarity)) if similarity >= thresholds.weak => {
                        used.insert(idx);
                        semantic_outcome(job, &resume_skills[idx], similarity, thresholds)
                    }
                    _ => MatchOutcome::Missing(MissingSkill {
                        skill: job.skill.name.clone(),
                        importance: job.requirement.importance,
                    }),
                }
            }
        };

        debug!(skill = %job.skill.key, outcome = ?outcome, "Classified job skill");
        matches.push(SkillMatch {
            job: job.clone(),
            outcome,
        });
    }

    let job_keys: HashSet<&SkillKey> = job_skills.iter().map(|j| &j.skill.key).collect();
    let additional_skills = resume_skills
        .iter()
        .enumerate()
        .filter(|(idx, r)| !used.contains(idx) && !job_keys.contains(&r.skill.key))
        .map(|(_, r)| r.skill.name.clone())
        .collect();

    Ok(MatchReport {
        matches,
        additional_skills,
    })
}

fn exact_outcome(job: &JobSkill, resume: &ResumeSkill) -> MatchOutcome {
    let required = job.requirement.required_level;
    if let (Some(wanted), Some(has)) = (job.requirement.years, resume.evidence.years) {
        let current = round2(years_to_level(has));
        if has < wanted && current < required {
            return MatchOutcome::Weak(WeakSkill {
                skill: job.skill.name.clone(),
                current_level: current,
                required_level: required,
                closest_match: None,
            });
        }
    }
    MatchOutcome::Matched(MatchedSkill {
        name: job.skill.name.clone(),
        category: job.skill.category.clone(),
    })
}

fn semantic_outcome(
    job: &JobSkill,
    resume: &ResumeSkill,
    similarity: f32,
    thresholds: MatchThresholds,
) -> MatchOutcome {
    if similarity >= thresholds.matched {
        return MatchOutcome::Matched(MatchedSkill {
            name: job.skill.name.clone(),
            category: job.skill.category.clone(),
        });
    }

    let required = job.requirement.required_level;
    let current = round2(required * similarity * resume.evidence.level).max(0.01);
    MatchOutcome::Weak(WeakSkill {
        skill: job.skill.name.clone(),
        current_level: current,
        required_level: required,
        closest_match: Some(resume.skill.name.clone()),
    })
}

/// Index and similarity of the closest résumé vector. Ties keep the earlier skill.
fn best_match(vector: &[f32], candidates: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let similarity = cosine(vector, candidate);
        if best.map_or(true, |(_, s)| similarity > s) {
            best = Some((idx, similarity));
        }
    }
    best
}
