//! Gap Analyzer & Planner — turns missing and weak skills into prioritized
//! improvement suggestions with learning paths, resources and time estimates.

use crate::analysis::matcher::{MatchOutcome, MatchReport, SkillMatch};
use crate::analysis::normalizer::RoleContext;
use crate::models::analysis::{ImprovementSuggestion, LearningResource, Priority, ResourceKind};

/// Weak skills with at least this gap are escalated one priority level.
const ESCALATION_GAP: f32 = 0.4;

const CURATED_PATHS: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "Learn Python basics and syntax",
            "Practice with small projects and exercises",
            "Study Python libraries relevant to your field",
            "Build a portfolio project using Python",
        ],
    ),
    (
        "react",
        &[
            "Learn JavaScript fundamentals",
            "Understand React basics: components, props, state",
            "Learn React hooks and modern patterns",
            "Build a full React application",
        ],
    ),
    (
        "machine learning",
        &[
            "Learn Python and math fundamentals",
            "Study ML algorithms and concepts",
            "Practice with scikit-learn and datasets",
            "Work on ML projects and participate in competitions",
        ],
    ),
    (
        "kubernetes",
        &[
            "Learn container fundamentals and how pods, services and deployments relate",
            "Run a local cluster with kind or minikube and deploy a sample app",
            "Add config maps, secrets, health probes and autoscaling",
            "Deploy a multi-service project to a managed cluster",
        ],
    ),
    (
        "docker",
        &[
            "Learn images, containers, volumes and networking",
            "Write Dockerfiles for an existing project",
            "Compose a multi-container setup with Docker Compose",
            "Optimize an image for size and build caching",
        ],
    ),
    (
        "sql",
        &[
            "Learn SELECT, filtering, joins and aggregation",
            "Practice queries against a sample dataset",
            "Study indexing, transactions and query plans",
            "Design a schema and reporting queries for a small application",
        ],
    ),
    (
        "aws",
        &[
            "Learn core AWS services: IAM, EC2, S3 and VPC",
            "Complete guided labs in a free-tier account",
            "Deploy an application with managed services",
            "Prepare for an associate-level AWS certification",
        ],
    ),
];

/// Course and tutorial providers per vocabulary category.
const CATEGORY_PROVIDERS: &[(&str, &str, &str)] = &[
    ("Programming Languages", "Coursera", "Exercism"),
    ("Frontend", "Frontend Masters", "freeCodeCamp"),
    ("Backend", "Udemy", "freeCodeCamp"),
    ("Database", "Coursera", "SQLBolt"),
    ("DevOps", "KodeKloud", "freeCodeCamp"),
    ("Cloud", "A Cloud Guru", "Cloud provider labs"),
    ("AI/ML", "Coursera", "Kaggle Learn"),
    ("Data", "DataCamp", "Kaggle Learn"),
    ("Testing", "Test Automation University", "freeCodeCamp"),
    ("Tools", "Udemy", "freeCodeCamp"),
    ("Practices", "Coursera", "Martin Fowler's blog"),
    ("Mobile", "Udacity", "freeCodeCamp"),
];

/// One suggestion per missing or weak skill, sorted by priority then by the
/// skill's position in the job description.
pub fn plan(report: &MatchReport, job_context: &RoleContext) -> Vec<ImprovementSuggestion> {
    let mut planned: Vec<(Priority, usize, ImprovementSuggestion)> = report
        .matches
        .iter()
        .filter_map(|m| suggestion_for(m, job_context))
        .collect();

    planned.sort_by_key(|(priority, position, _)| (*priority, *position));
    planned.into_iter().map(|(_, _, s)| s).collect()
}

fn suggestion_for(
    m: &SkillMatch,
    job_context: &RoleContext,
) -> Option<(Priority, usize, ImprovementSuggestion)> {
    let base = Priority::from(m.job.requirement.importance);
    let (skill, priority, closest) = match &m.outcome {
        MatchOutcome::Matched(_) => return None,
        MatchOutcome::Missing(missing) => (missing.skill.as_str(), base, None),
        MatchOutcome::Weak(weak) => {
            let priority = if m.gap() >= ESCALATION_GAP {
                base.escalate()
            } else {
                base
            };
            (weak.skill.as_str(), priority, weak.closest_match.as_deref())
        }
    };

    let mut learning_path = Vec::new();
    if let Some(known) = closest {
        learning_path.push(format!(
            "Map what you already know from {known} onto {skill}: compare their core concepts side by side"
        ));
    }
    learning_path.extend(base_path(skill));
    if job_context.seniority.is_some_and(|s| s.is_senior_or_above()) {
        learning_path.push(format!(
            "Write up the design trade-offs of a {skill} solution as you would for a senior-level review"
        ));
    }

    let suggestion = ImprovementSuggestion {
        skill: skill.to_string(),
        priority,
        learning_path,
        resources: resources_for(skill, m.job.skill.category.as_deref()),
        estimated_time: estimate_time(m.gap()).to_string(),
    };
    Some((priority, m.job.skill.position(), suggestion))
}

fn base_path(skill: &str) -> Vec<String> {
    let key = skill.to_ascii_lowercase();
    match CURATED_PATHS.iter().find(|(name, _)| *name == key) {
        Some((_, steps)) => steps.iter().map(|s| s.to_string()).collect(),
        None => vec![
            format!("Study {skill} fundamentals and core concepts"),
            "Practice with hands-on exercises and tutorials".to_string(),
            format!("Build small projects using {skill}"),
            format!("Create a portfolio piece demonstrating {skill} proficiency"),
        ],
    }
}

fn resources_for(skill: &str, category: Option<&str>) -> Vec<LearningResource> {
    let mut resources = Vec::new();

    if let Some((_, course, tutorial)) = category
        .and_then(|c| CATEGORY_PROVIDERS.iter().find(|(name, _, _)| *name == c))
    {
        resources.push(LearningResource {
            title: format!("{skill} Complete Course"),
            provider: course.to_string(),
            kind: ResourceKind::Course,
            duration: "4-6 weeks".to_string(),
        });
        resources.push(LearningResource {
            title: format!("Learn {skill} - Interactive Tutorial"),
            provider: tutorial.to_string(),
            kind: ResourceKind::Tutorial,
            duration: "2-3 weeks".to_string(),
        });
    }

    resources.push(LearningResource {
        title: format!("Official {skill} Documentation"),
        provider: "Official documentation".to_string(),
        kind: ResourceKind::Documentation,
        duration: "Self-paced".to_string(),
    });
    resources.push(LearningResource {
        title: format!("{skill} Project Ideas"),
        provider: "GitHub".to_string(),
        kind: ResourceKind::Project,
        duration: "Varies".to_string(),
    });

    resources
}

/// Coarse estimate from `required - current`.
pub fn estimate_time(gap: f32) -> &'static str {
    match gap {
        g if g >= 0.7 => "2-3 months",
        g if g >= 0.4 => "1-2 months",
        g if g >= 0.2 => "2-4 weeks",
        _ => "1-2 weeks",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::matcher::JobSkill;
    use crate::analysis::normalizer::Seniority;
    use crate::analysis::proficiency::JobRequirement;
    use crate::models::analysis::{Importance, MatchedSkill, MissingSkill, Skill, SkillKey, WeakSkill};

    fn job(name: &str, offset: usize, importance: Importance, category: Option<&str>) -> JobSkill {
        JobSkill {
            skill: Skill {
                key: SkillKey::new(name),
                name: name.to_string(),
                confidence: 0.9,
                category: category.map(str::to_string),
                mentions: vec![offset],
            },
            requirement: JobRequirement {
                importance,
                required_level: importance.base_level(),
                years: None,
            },
        }
    }

    fn missing(name: &str, offset: usize, importance: Importance) -> SkillMatch {
        SkillMatch {
            job: job(name, offset, importance, Some("DevOps")),
            outcome: MatchOutcome::Missing(MissingSkill {
                skill: name.to_string(),
                importance,
            }),
        }
    }

    fn weak(name: &str, offset: usize, importance: Importance, current: f32) -> SkillMatch {
        SkillMatch {
            job: job(name, offset, importance, Some("Frontend")),
            outcome: MatchOutcome::Weak(WeakSkill {
                skill: name.to_string(),
                current_level: current,
                required_level: importance.base_level(),
                closest_match: Some("Vue".to_string()),
            }),
        }
    }

    fn report(matches: Vec<SkillMatch>) -> MatchReport {
        MatchReport {
            matches,
            additional_skills: Vec::new(),
        }
    }

    #[test]
    fn test_matched_skills_get_no_suggestion() {
        let matched = SkillMatch {
            job: job("Python", 0, Importance::High, None),
            outcome: MatchOutcome::Matched(MatchedSkill {
                name: "Python".to_string(),
                category: None,
            }),
        };
        assert!(plan(&report(vec![matched]), &RoleContext::default()).is_empty());
    }

    #[test]
    fn test_sorted_by_priority_then_position() {
        let suggestions = plan(
            &report(vec![
                missing("Terraform", 0, Importance::Low),
                missing("Helm", 10, Importance::High),
                missing("Ansible", 20, Importance::Medium),
                missing("Kubernetes", 30, Importance::High),
            ]),
            &RoleContext::default(),
        );
        let order: Vec<_> = suggestions.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(order, vec!["Helm", "Kubernetes", "Ansible", "Terraform"]);
    }

    #[test]
    fn test_large_weak_gap_escalates_priority() {
        let suggestions = plan(
            &report(vec![
                weak("React", 0, Importance::Medium, 0.1),
                weak("Svelte", 5, Importance::Medium, 0.5),
            ]),
            &RoleContext::default(),
        );
        assert_eq!(suggestions[0].skill, "React");
        assert_eq!(suggestions[0].priority, Priority::High);
        assert_eq!(suggestions[1].priority, Priority::Medium);
    }

    #[test]
    fn test_curated_and_generic_paths_have_at_least_two_steps() {
        let suggestions = plan(
            &report(vec![
                missing("Kubernetes", 0, Importance::High),
                missing("Pulumi", 5, Importance::High),
            ]),
            &RoleContext::default(),
        );
        assert!(suggestions.iter().all(|s| s.learning_path.len() >= 2));
        assert!(suggestions[0].learning_path[1].contains("local cluster"));
        assert!(suggestions[1].learning_path[0].contains("Pulumi fundamentals"));
    }

    #[test]
    fn test_weak_path_starts_from_closest_skill() {
        let suggestions = plan(
            &report(vec![weak("React", 0, Importance::High, 0.3)]),
            &RoleContext::default(),
        );
        assert!(suggestions[0].learning_path[0].starts_with("Map what you already know from Vue onto React"));
        assert_eq!(suggestions[0].learning_path[1], "Learn JavaScript fundamentals");
    }

    #[test]
    fn test_senior_roles_add_design_step() {
        let context = RoleContext {
            title: Some("Senior Platform Engineer".to_string()),
            seniority: Some(Seniority::Senior),
        };
        let suggestions = plan(&report(vec![missing("Helm", 0, Importance::High)]), &context);
        let last = suggestions[0].learning_path.last().unwrap();
        assert!(last.contains("senior-level review"));
    }

    #[test]
    fn test_resources_follow_category() {
        let suggestions = plan(
            &report(vec![missing("Helm", 0, Importance::High)]),
            &RoleContext::default(),
        );
        let kinds: Vec<_> = suggestions[0].resources.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Course,
                ResourceKind::Tutorial,
                ResourceKind::Documentation,
                ResourceKind::Project
            ]
        );
        assert_eq!(suggestions[0].resources[0].provider, "KodeKloud");
    }

    #[test]
    fn test_uncategorized_skill_still_gets_resources() {
        assert_eq!(resources_for("LangChain", None).len(), 2);
    }

    #[test]
    fn test_estimated_time_tracks_gap() {
        assert_eq!(estimate_time(0.8), "2-3 months");
        assert_eq!(estimate_time(0.5), "1-2 months");
        assert_eq!(estimate_time(0.25), "2-4 weeks");
        assert_eq!(estimate_time(0.05), "1-2 weeks");

        let suggestions = plan(
            &report(vec![missing("Helm", 0, Importance::High)]),
            &RoleContext::default(),
        );
        assert_eq!(suggestions[0].estimated_time, "2-3 months");
    }
}
