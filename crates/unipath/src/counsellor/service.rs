//! Runs a counsellor turn: build context, ask the model, execute its actions.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::context::CounsellorContext;
use super::model::CounsellorModel;
use super::models::{
    ActionResult, ActionStatus, CounsellorRequest, CounsellorResponse, PlannedAction,
};
use crate::catalog::{Recommendations, UniversityRepository, recommend::recommend};
use crate::profile::ProfileService;
use crate::shortlist::{ShortlistRequest, ShortlistService};
use crate::stage::StageTracker;
use crate::tasks::{CreateTaskRequest, TaskService};
use crate::workflow::{Validator, WorkflowError};

/// Upper bound on actions executed from a single plan.
const MAX_ACTIONS: usize = 10;

#[derive(Clone)]
pub struct CounsellorService {
    model: Arc<dyn CounsellorModel>,
    profiles: ProfileService,
    stages: StageTracker,
    universities: UniversityRepository,
    shortlists: ShortlistService,
    tasks: TaskService,
}

impl std::fmt::Debug for CounsellorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounsellorService")
            .field("model", &self.model.name())
            .finish_non_exhaustive()
    }
}

/// How a failed service call is reported for one action.
fn outcome(kind: &str, err: anyhow::Error, skip_conflicts: bool) -> ActionResult {
    match err.downcast_ref::<WorkflowError>() {
        Some(WorkflowError::Conflict(msg)) if skip_conflicts => {
            ActionResult::new(kind, ActionStatus::Skipped, msg.clone())
        }
        Some(WorkflowError::Invalid(msg)) if skip_conflicts => {
            ActionResult::new(kind, ActionStatus::Skipped, msg.clone())
        }
        Some(rejection) => ActionResult::new(kind, ActionStatus::Failed, rejection.to_string()),
        None => {
            error!("Counsellor action {} failed: {:#}", kind, err);
            ActionResult::new(kind, ActionStatus::Failed, "Internal error")
        }
    }
}

impl CounsellorService {
    pub fn new(
        model: Arc<dyn CounsellorModel>,
        profiles: ProfileService,
        stages: StageTracker,
        universities: UniversityRepository,
        shortlists: ShortlistService,
        tasks: TaskService,
    ) -> Self {
        Self {
            model,
            profiles,
            stages,
            universities,
            shortlists,
            tasks,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Handle one counsellor message.
    #[instrument(skip(self, request), fields(model = %self.model.name()))]
    pub async fn chat(&self, user_id: &str, request: CounsellorRequest) -> Result<CounsellorResponse> {
        let message = request.message.trim().to_string();
        Validator::new().length("message", &message, 1, 2000).finish()?;

        let profile = self.profiles.require(user_id).await?;
        let stage = self.stages.refreshed_info(user_id).await?;
        let recommendations = recommend(&profile, self.universities.all().await?);

        let context = CounsellorContext {
            message,
            stage,
            profile,
            recommendations,
        };

        let plan = self.model.plan(&context).await?;
        info!(
            user_id,
            intent = ?plan.intent,
            actions = plan.actions.len(),
            "Counsellor plan received"
        );

        let mut results = Vec::with_capacity(plan.actions.len());
        for (i, action) in plan.actions.iter().enumerate() {
            if i >= MAX_ACTIONS {
                results.push(ActionResult::new(
                    action.kind(),
                    ActionStatus::Skipped,
                    "Too many actions in one message",
                ));
                continue;
            }
            results.push(self.execute(user_id, action, &context.recommendations).await);
        }

        Ok(CounsellorResponse {
            intent: plan.intent,
            reply: plan.explanation,
            recommendations: plan
                .recommendations
                .or_else(|| Some(context.recommendations.ids())),
            actions: results,
            model: self.model.name().to_string(),
        })
    }

    async fn execute(
        &self,
        user_id: &str,
        action: &PlannedAction,
        recommendations: &Recommendations,
    ) -> ActionResult {
        let kind = action.kind();
        match action {
            PlannedAction::Shortlist {
                university_id,
                category,
            } => {
                let Some(id) = *university_id else {
                    return ActionResult::new(kind, ActionStatus::Failed, "Missing university_id");
                };
                let Some(rec) = recommendations.get(id) else {
                    warn!(user_id, university_id = id, "Model proposed unknown university");
                    return ActionResult::new(
                        kind,
                        ActionStatus::Failed,
                        "University is not in your recommendations",
                    )
                    .university(id);
                };
                // Fall back to the derived bucket when the model's category is unusable.
                let category = category
                    .as_deref()
                    .filter(|c| c.parse::<crate::catalog::Category>().is_ok())
                    .map(str::to_string)
                    .unwrap_or_else(|| rec.category.to_string());

                let request = ShortlistRequest {
                    university_id: id,
                    category: Some(category),
                };
                match self.shortlists.shortlist(user_id, request).await {
                    Ok(res) => ActionResult::new(
                        kind,
                        ActionStatus::Executed,
                        format!("{} shortlisted as {}", res.university_name, res.category),
                    )
                    .university(id),
                    Err(e) => outcome(kind, e, true).university(id),
                }
            }
            PlannedAction::Lock { university_id } => {
                let Some(id) = *university_id else {
                    return ActionResult::new(kind, ActionStatus::Failed, "Missing university_id");
                };
                if recommendations.get(id).is_none() {
                    warn!(user_id, university_id = id, "Model proposed unknown university");
                    return ActionResult::new(
                        kind,
                        ActionStatus::Failed,
                        "University is not in your recommendations",
                    )
                    .university(id);
                }
                match self.shortlists.lock(user_id, id).await {
                    Ok(res) => ActionResult::new(
                        kind,
                        ActionStatus::Executed,
                        format!("{} locked", res.university_name),
                    )
                    .university(id),
                    Err(e) => outcome(kind, e, true).university(id),
                }
            }
            PlannedAction::CreateTask { title, stage } => {
                let Some(title) = title.as_deref().filter(|t| !t.trim().is_empty()) else {
                    return ActionResult::new(kind, ActionStatus::Failed, "Missing task title");
                };
                let request = CreateTaskRequest {
                    title: title.to_string(),
                    stage: stage.clone(),
                };
                match self.tasks.create(user_id, request).await {
                    Ok(task) => {
                        ActionResult::new(kind, ActionStatus::Executed, "Task created").task(task.id)
                    }
                    Err(e) => outcome(kind, e, false),
                }
            }
            PlannedAction::GenerateTasks => match self.tasks.generate_defaults(user_id).await {
                Ok(res) => ActionResult::new(kind, ActionStatus::Executed, res.message),
                Err(e) => outcome(kind, e, false),
            },
            PlannedAction::Unknown => {
                ActionResult::new("unknown", ActionStatus::Failed, "Unknown action")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counsellor::{CounsellorResult, Intent, Plan, RuleBasedModel};
    use crate::db::Database;
    use crate::profile::{ProfileRepository, ProfileRequest};
    use crate::shortlist::ShortlistRepository;
    use crate::stage::Stage;
    use crate::tasks::TaskRepository;
    use async_trait::async_trait;

    /// Model that always answers with a fixed plan.
    struct Scripted(Plan);

    #[async_trait]
    impl CounsellorModel for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn plan(&self, _context: &CounsellorContext) -> CounsellorResult<Plan> {
            Ok(self.0.clone())
        }
    }

    async fn setup(model: Arc<dyn CounsellorModel>, onboard: bool) -> (CounsellorService, sqlx::SqlitePool) {
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool().clone();
        sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES ('u1', 'A', 'a@example.com', 'x')")
            .execute(&pool)
            .await
            .unwrap();

        let stages = StageTracker::new(pool.clone());
        let profiles = ProfileService::new(ProfileRepository::new(pool.clone()), stages.clone());
        if onboard {
            profiles
                .complete_onboarding(
                    "u1",
                    ProfileRequest {
                        budget_range: Some("30000-50000".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        let shortlists = ShortlistService::new(
            ShortlistRepository::new(pool.clone()),
            UniversityRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            stages.clone(),
        );
        let tasks = TaskService::new(
            TaskRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            ShortlistRepository::new(pool.clone()),
            stages.clone(),
        );
        let service = CounsellorService::new(
            model,
            profiles,
            stages,
            UniversityRepository::new(pool.clone()),
            shortlists,
            tasks,
        );
        (service, pool)
    }

    fn ask(message: &str) -> CounsellorRequest {
        CounsellorRequest {
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_requires_profile() {
        let (service, _) = setup(Arc::new(RuleBasedModel), false).await;
        let err = service.chat("u1", ask("hi")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_message_length_validated() {
        let (service, _) = setup(Arc::new(RuleBasedModel), true).await;
        let err = service.chat("u1", ask("   ")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Validation(_))
        ));
        let err = service.chat("u1", ask(&"a".repeat(2001))).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_scripted_actions_are_validated() {
        let plan = Plan {
            intent: Intent::ShortlistUniversity,
            explanation: "ok".into(),
            recommendations: None,
            actions: vec![
                PlannedAction::Shortlist {
                    university_id: Some(3),
                    category: Some("bogus".into()),
                },
                PlannedAction::Shortlist {
                    university_id: Some(3),
                    category: None,
                },
                PlannedAction::Shortlist {
                    university_id: Some(424242),
                    category: None,
                },
                PlannedAction::Lock { university_id: Some(3) },
                PlannedAction::Lock { university_id: Some(3) },
                PlannedAction::Lock { university_id: None },
                PlannedAction::CreateTask {
                    title: Some("Draft SOP".into()),
                    stage: Some("STAGE_4_APPLICATION".into()),
                },
                PlannedAction::CreateTask {
                    title: None,
                    stage: None,
                },
                PlannedAction::Unknown,
            ],
        };
        let (service, pool) = setup(Arc::new(Scripted(plan)), true).await;
        let res = service.chat("u1", ask("do it")).await.unwrap();

        let statuses: Vec<ActionStatus> = res.actions.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            vec![
                ActionStatus::Executed,
                ActionStatus::Skipped,
                ActionStatus::Failed,
                ActionStatus::Executed,
                ActionStatus::Skipped,
                ActionStatus::Failed,
                ActionStatus::Executed,
                ActionStatus::Failed,
                ActionStatus::Failed,
            ]
        );
        assert!(res.actions[6].task_id.is_some());
        assert_eq!(res.model, "scripted");

        let stage = StageTracker::new(pool).refresh("u1").await.unwrap();
        assert_eq!(stage, Stage::Application);
    }

    #[tokio::test]
    async fn test_rules_model_end_to_end() {
        let (service, _) = setup(Arc::new(RuleBasedModel), true).await;
        let res = service
            .chat("u1", ask("Please shortlist University of Leeds"))
            .await
            .unwrap();
        assert_eq!(res.intent, Intent::ShortlistUniversity);
        assert_eq!(res.actions.len(), 1);
        assert_eq!(res.actions[0].status, ActionStatus::Executed);
        assert_eq!(res.model, "rules");
    }
}
