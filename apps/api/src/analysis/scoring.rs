//! Score Aggregator — skill-match percentage, profile-fit score and the summary line.
//!
//! profile_fit = 80·coverage + 20·seniority_fit
//!             − min(25, 5·missing_high + 2·missing_medium)
//!             − min(10, 5·Σ weak gaps)
//!
//! Coverage is importance-weighted (high 3, medium 2, low 1): a matched skill
//! counts fully, a weak one counts `current / required`, a missing one zero.

use crate::analysis::matcher::{MatchOutcome, MatchReport};
use crate::analysis::normalizer::Seniority;
use crate::models::analysis::Importance;

const COVERAGE_WEIGHT: f64 = 80.0;
const SENIORITY_WEIGHT: f64 = 20.0;
const MISSING_PENALTY_CAP: f64 = 25.0;
const WEAK_PENALTY_CAP: f64 = 10.0;

/// `100 · matched / (matched + missing)`, one decimal; 0 when both are empty.
pub fn skill_match_percentage(matched: usize, missing: usize) -> f64 {
    let total = matched + missing;
    if total == 0 {
        return 0.0;
    }
    round1(100.0 * matched as f64 / total as f64)
}

pub fn profile_fit_score(
    report: &MatchReport,
    job_seniority: Option<Seniority>,
    resume_seniority: Option<Seniority>,
) -> f64 {
    if report.matches.is_empty() {
        return 0.0;
    }

    let mut weighted_total = 0.0;
    let mut weighted_covered = 0.0;
    let mut missing_high = 0u32;
    let mut missing_medium = 0u32;
    let mut weak_gaps = 0.0;

    for m in &report.matches {
        let weight = m.job.requirement.importance.weight() as f64;
        weighted_total += weight;
        match &m.outcome {
            MatchOutcome::Matched(_) => weighted_covered += weight,
            MatchOutcome::Weak(weak) => {
                if weak.required_level > 0.0 {
                    weighted_covered +=
                        weight * (weak.current_level / weak.required_level).min(1.0) as f64;
                }
                weak_gaps += m.gap() as f64;
            }
            MatchOutcome::Missing(missing) => match missing.importance {
                Importance::High => missing_high += 1,
                Importance::Medium => missing_medium += 1,
                Importance::Low => {}
            },
        }
    }

    let coverage = weighted_covered / weighted_total;
    let missing_penalty =
        (5.0 * missing_high as f64 + 2.0 * missing_medium as f64).min(MISSING_PENALTY_CAP);
    let weak_penalty = (5.0 * weak_gaps).min(WEAK_PENALTY_CAP);

    let score = COVERAGE_WEIGHT * coverage
        + SENIORITY_WEIGHT * seniority_fit(job_seniority, resume_seniority)
        - missing_penalty
        - weak_penalty;

    round1(score.clamp(0.0, 100.0))
}

/// 1.0 when the job is silent or the résumé meets it, 0.5 one rung short or
/// unknown, 0.0 further below.
pub fn seniority_fit(job: Option<Seniority>, resume: Option<Seniority>) -> f64 {
    match (job, resume) {
        (None, _) => 1.0,
        (Some(_), None) => 0.5,
        (Some(wanted), Some(has)) if has >= wanted => 1.0,
        (Some(wanted), Some(has)) if wanted as u8 - has as u8 == 1 => 0.5,
        _ => 0.0,
    }
}

pub fn analysis_summary(profile_fit: f64, matched: usize, missing: usize, weak: usize) -> String {
    let band = match profile_fit {
        s if s >= 80.0 => "excellent",
        s if s >= 60.0 => "good",
        s if s >= 40.0 => "moderate",
        _ => "weak",
    };

    let mut summary = format!(
        "Your profile shows a {band} fit for this position. You match {matched} key {} required for the role.",
        plural(matched, "skill", "skills")
    );
    if weak > 0 {
        summary.push_str(&format!(
            " {weak} {} could use more depth.",
            plural(weak, "skill", "skills")
        ));
    }
    if missing > 0 {
        summary.push_str(&format!(
            " There {} {missing} {} that could strengthen your application. Focus on the high-priority skills in the improvement suggestions to increase your competitiveness.",
            plural(missing, "is", "are"),
            plural(missing, "skill", "skills")
        ));
    } else if matched > 0 {
        summary.push_str(" You have all the key skills mentioned in the job description!");
    }
    summary
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::matcher::{JobSkill, SkillMatch};
    use crate::analysis::proficiency::JobRequirement;
    use crate::models::analysis::{MatchedSkill, MissingSkill, Skill, SkillKey, WeakSkill};

    fn entry(name: &str, importance: Importance, outcome: MatchOutcome) -> SkillMatch {
        SkillMatch {
            job: JobSkill {
                skill: Skill {
                    key: SkillKey::new(name),
                    name: name.to_string(),
                    confidence: 0.9,
                    category: None,
                    mentions: vec![0],
                },
                requirement: JobRequirement {
                    importance,
                    required_level: importance.base_level(),
                    years: None,
                },
            },
            outcome,
        }
    }

    fn matched(name: &str, importance: Importance) -> SkillMatch {
        entry(
            name,
            importance,
            MatchOutcome::Matched(MatchedSkill {
                name: name.to_string(),
                category: None,
            }),
        )
    }

    fn missing(name: &str, importance: Importance) -> SkillMatch {
        entry(
            name,
            importance,
            MatchOutcome::Missing(MissingSkill {
                skill: name.to_string(),
                importance,
            }),
        )
    }

    fn report(matches: Vec<SkillMatch>) -> MatchReport {
        MatchReport {
            matches,
            additional_skills: Vec::new(),
        }
    }

    #[test]
    fn test_skill_match_percentage() {
        assert_eq!(skill_match_percentage(2, 1), 66.7);
        assert_eq!(skill_match_percentage(0, 3), 0.0);
        assert_eq!(skill_match_percentage(4, 0), 100.0);
        assert_eq!(skill_match_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_fit_for_two_of_three_high_skills() {
        let report = report(vec![
            matched("Python", Importance::High),
            missing("Kubernetes", Importance::High),
            matched("Docker", Importance::High),
        ]);
        // 80 · 6/9 + 20 − 5
        assert_eq!(profile_fit_score(&report, None, None), 68.3);
    }

    #[test]
    fn test_weak_skills_count_partially_and_penalize() {
        let report = report(vec![entry(
            "React",
            Importance::High,
            MatchOutcome::Weak(WeakSkill {
                skill: "React".to_string(),
                current_level: 0.4,
                required_level: 0.8,
                closest_match: Some("Vue".to_string()),
            }),
        )]);
        // 80 · 0.5 + 20 − 5 · 0.4
        assert_eq!(profile_fit_score(&report, None, None), 58.0);
    }

    #[test]
    fn test_missing_penalty_is_capped_and_score_clamped() {
        let report = report(
            (0..10)
                .map(|i| missing(&format!("skill-{i}"), Importance::High))
                .collect(),
        );
        assert_eq!(profile_fit_score(&report, Some(Seniority::Lead), Some(Seniority::Entry)), 0.0);
    }

    #[test]
    fn test_no_job_skills_scores_zero() {
        assert_eq!(profile_fit_score(&report(Vec::new()), None, None), 0.0);
    }

    #[test]
    fn test_seniority_fit_ladder() {
        assert_eq!(seniority_fit(None, Some(Seniority::Entry)), 1.0);
        assert_eq!(seniority_fit(Some(Seniority::Senior), Some(Seniority::Lead)), 1.0);
        assert_eq!(seniority_fit(Some(Seniority::Senior), Some(Seniority::Mid)), 0.5);
        assert_eq!(seniority_fit(Some(Seniority::Senior), None), 0.5);
        assert_eq!(seniority_fit(Some(Seniority::Lead), Some(Seniority::Entry)), 0.0);
    }

    #[test]
    fn test_summary_bands_and_counts() {
        let summary = analysis_summary(68.3, 2, 1, 0);
        assert!(summary.starts_with("Your profile shows a good fit"));
        assert!(summary.contains("You match 2 key skills"));
        assert!(summary.contains("There is 1 skill that could strengthen"));

        let summary = analysis_summary(92.0, 3, 0, 0);
        assert!(summary.contains("excellent"));
        assert!(summary.ends_with("mentioned in the job description!"));

        assert!(analysis_summary(10.0, 0, 4, 0).contains("weak fit"));
        assert!(analysis_summary(45.0, 1, 1, 1).contains("1 skill could use more depth"));
    }
}
