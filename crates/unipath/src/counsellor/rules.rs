//! Deterministic keyword-routing model.
//!
//! Resolves universities by name or `#id` against the recommendation set and
//! proposes actions for them. Never reaches the network.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::context::CounsellorContext;
use super::error::CounsellorResult;
use super::model::CounsellorModel;
use super::models::{Intent, Plan, PlannedAction};
use crate::catalog::RecommendedUniversity;
use crate::stage::Stage;

static ID_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:#|\bid\s*)(\d+)\b").expect("Invalid regex pattern for id mention"));

static TASK_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:add (?:a )?task\s*:?|remind me to|todo\s*:)\s*(.+)$")
        .expect("Invalid regex pattern for task title")
});

/// Name words too common to identify a university on their own.
const GENERIC_WORDS: &[&str] = &[
    "university",
    "college",
    "institute",
    "technology",
    "national",
    "technical",
    "state",
    "school",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedModel;

fn has_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

fn has_word(words: &[&str], candidates: &[&str]) -> bool {
    words.iter().any(|w| candidates.contains(w))
}

/// Title of an explicit task request ("add task: ...", "remind me to ...").
fn task_title(message: &str) -> Option<String> {
    TASK_TITLE
        .captures(message.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Universities from the recommendation set mentioned in the message.
fn mentioned<'a>(
    context: &'a CounsellorContext,
    text: &str,
    words: &[&str],
) -> Vec<&'a RecommendedUniversity> {
    let ids: Vec<i64> = ID_MENTION
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect();

    context
        .recommendations
        .iter()
        .filter(|rec| {
            let name = rec.university.name.to_lowercase();
            ids.contains(&rec.university.id)
                || text.contains(&name)
                || name
                    .split_whitespace()
                    .filter(|w| w.len() >= 4 && !GENERIC_WORDS.contains(w))
                    .any(|w| words.contains(&w))
        })
        .collect()
}

fn names(list: &[&RecommendedUniversity]) -> String {
    list.iter()
        .map(|r| r.university.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn top(list: &[RecommendedUniversity], n: usize) -> String {
    let picks: Vec<&RecommendedUniversity> = list.iter().take(n).collect();
    if picks.is_empty() {
        "none".to_string()
    } else {
        names(&picks)
    }
}

fn next_step(stage: Stage) -> &'static str {
    match stage {
        Stage::Profile => "Finish onboarding so I can tailor recommendations to you.",
        Stage::Discovery => {
            "Browse your recommendations and shortlist the universities you like. Ask me to \"shortlist <name>\"."
        }
        Stage::Locking => {
            "Compare your shortlist and lock at least one university to start your applications. Ask me to \"lock <name>\"."
        }
        Stage::Application => {
            "Work through your application tasks. Ask me to \"generate tasks\" for a checklist."
        }
    }
}

impl RuleBasedModel {
    fn route(&self, context: &CounsellorContext) -> Plan {
        let text = context.message.to_lowercase();
        let words = split_words(&text);
        let recs = &context.recommendations;
        let hits = mentioned(context, &text, &words);

        // Explicit task requests win, even when they name a university.
        if let Some(title) = task_title(&context.message) {
            return Plan {
                intent: Intent::CreateTasks,
                explanation: "Adding that to your task list.".to_string(),
                recommendations: None,
                actions: vec![PlannedAction::CreateTask {
                    title: Some(title),
                    stage: None,
                }],
            };
        }

        let wants_lock = has_word(&words, &["lock"]);
        let wants_shortlist = has_word(&words, &["shortlist", "save"]) && !hits.is_empty();
        let wants_tasks = has_any(&text, &["task", "todo", "checklist", "remind me"]);
        let wants_recs = has_any(
            &text,
            &["recommend", "suggest", "which universit", "options", "dream", "safe", "target", "afford"],
        );

        if wants_lock && !hits.is_empty() {
            return Plan {
                intent: Intent::LockUniversity,
                explanation: format!(
                    "Locking {}. Locked universities move you into application preparation.",
                    names(&hits)
                ),
                recommendations: None,
                actions: hits
                    .iter()
                    .map(|r| PlannedAction::Lock {
                        university_id: Some(r.university.id),
                    })
                    .collect(),
            };
        }

        if wants_shortlist {
            return Plan {
                intent: Intent::ShortlistUniversity,
                explanation: format!("Adding {} to your shortlist.", names(&hits)),
                recommendations: None,
                actions: hits
                    .iter()
                    .map(|r| PlannedAction::Shortlist {
                        university_id: Some(r.university.id),
                        category: Some(r.category.to_string()),
                    })
                    .collect(),
            };
        }

        if wants_tasks {
            return Plan {
                intent: Intent::CreateTasks,
                explanation: format!(
                    "Building your checklist for the '{}' stage.",
                    context.stage.display_name
                ),
                recommendations: None,
                actions: vec![PlannedAction::GenerateTasks],
            };
        }

        if wants_recs {
            let budget = match recs.budget_ceiling {
                Some(b) => format!("your budget of up to {b} per year"),
                None => "your academic profile (no budget ceiling set)".to_string(),
            };
            return Plan {
                intent: Intent::RecommendUniversities,
                explanation: format!(
                    "Based on {budget}, you have {} safe, {} target and {} dream options. Safe picks: {}. Target picks: {}. Dream picks: {}.",
                    recs.safe.len(),
                    recs.target.len(),
                    recs.dream.len(),
                    top(&recs.safe, 3),
                    top(&recs.target, 3),
                    top(&recs.dream, 3),
                ),
                recommendations: Some(recs.ids()),
                actions: Vec::new(),
            };
        }

        Plan {
            intent: Intent::GeneralHelp,
            explanation: format!(
                "You are in the '{}' stage. {}",
                context.stage.display_name,
                next_step(context.stage.current_stage)
            ),
            recommendations: None,
            actions: Vec::new(),
        }
    }
}

#[async_trait]
impl CounsellorModel for RuleBasedModel {
    fn name(&self) -> &str {
        "rules"
    }

    async fn plan(&self, context: &CounsellorContext) -> CounsellorResult<Plan> {
        Ok(self.route(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, University, recommend::recommend};
    use crate::profile::Profile;
    use crate::stage::{StageFacts, StageInfo};

    fn context(message: &str) -> CounsellorContext {
        let universities = vec![
            University {
                id: 10,
                name: "University of Waterloo".into(),
                country: "Canada".into(),
                avg_cost: 41000,
                difficulty: Difficulty::Medium,
                fields: vec!["Computer Science".into()],
            },
            University {
                id: 11,
                name: "Deakin University".into(),
                country: "Australia".into(),
                avg_cost: 34000,
                difficulty: Difficulty::Low,
                fields: vec!["Information Technology".into()],
            },
        ];
        let mut profile = Profile::empty("u1");
        profile.budget_range = Some("30000-50000".into());
        let facts = StageFacts::new(true, 1, 0);
        let stage = Stage::derive(facts);
        CounsellorContext {
            message: message.to_string(),
            stage: StageInfo {
                current_stage: stage,
                stored_stage: stage,
                calculated_stage: stage,
                needs_update: false,
                display_name: stage.display_name(),
                next_stage: stage.next(),
                onboarding_completed: true,
                shortlist_count: 1,
                locked_count: 0,
            },
            recommendations: recommend(&profile, universities),
            profile,
        }
    }

    #[test]
    fn test_lock_by_name() {
        let plan = RuleBasedModel.route(&context("Please lock Waterloo for me"));
        assert_eq!(plan.intent, Intent::LockUniversity);
        assert_eq!(
            plan.actions,
            vec![PlannedAction::Lock {
                university_id: Some(10)
            }]
        );
    }

    #[test]
    fn test_shortlist_by_id() {
        let plan = RuleBasedModel.route(&context("shortlist #11"));
        assert_eq!(plan.intent, Intent::ShortlistUniversity);
        assert_eq!(
            plan.actions,
            vec![PlannedAction::Shortlist {
                university_id: Some(11),
                category: Some("Safe".into()),
            }]
        );
    }

    #[test]
    fn test_unknown_university_is_not_acted_on() {
        let plan = RuleBasedModel.route(&context("lock Harvard"));
        assert!(plan.actions.is_empty());
    }

    #[test]
    fn test_task_routing() {
        let plan = RuleBasedModel.route(&context("Add task: email my professor"));
        assert_eq!(
            plan.actions,
            vec![PlannedAction::CreateTask {
                title: Some("email my professor".into()),
                stage: None,
            }]
        );

        let plan = RuleBasedModel.route(&context("give me a checklist of tasks"));
        assert_eq!(plan.actions, vec![PlannedAction::GenerateTasks]);
    }

    #[test]
    fn test_task_naming_university_does_not_shortlist() {
        let plan = RuleBasedModel.route(&context("Add task: request transcript for Waterloo"));
        assert_eq!(plan.intent, Intent::CreateTasks);
        assert_eq!(
            plan.actions,
            vec![PlannedAction::CreateTask {
                title: Some("request transcript for Waterloo".into()),
                stage: None,
            }]
        );

        let plan = RuleBasedModel.route(&context("Remind me to lock Waterloo next week"));
        assert_eq!(plan.intent, Intent::CreateTasks);
        assert!(matches!(plan.actions[0], PlannedAction::CreateTask { .. }));

        // A bare "add" is not a shortlist request
        let plan = RuleBasedModel.route(&context("add Waterloo"));
        assert!(plan.actions.is_empty());
    }

    #[test]
    fn test_lock_matches_whole_words() {
        for message in [
            "Is Waterloo a block away from downtown?",
            "What time is it on the Waterloo clock?",
            "Please unlock Waterloo",
        ] {
            let plan = RuleBasedModel.route(&context(message));
            assert_ne!(plan.intent, Intent::LockUniversity, "{message}");
            assert!(plan.actions.is_empty(), "{message}");
        }
    }

    #[test]
    fn test_recommendations_and_help() {
        let plan = RuleBasedModel.route(&context("What do you recommend?"));
        assert_eq!(plan.intent, Intent::RecommendUniversities);
        assert!(plan.recommendations.is_some());
        assert!(plan.explanation.contains("Deakin University"));

        let plan = RuleBasedModel.route(&context("hello"));
        assert_eq!(plan.intent, Intent::GeneralHelp);
        assert!(plan.explanation.contains("Finalizing Universities"));
    }
}
