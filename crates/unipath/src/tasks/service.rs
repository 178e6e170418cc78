//! Task business logic.

use anyhow::Result;
use tracing::{info, instrument};

use super::defaults::{applicable, application_title};
use super::models::{
    CreateTaskRequest, GenerateTasksResponse, TaskListQuery, TaskResponse, TaskStatus,
    UpdateTaskRequest,
};
use super::repository::TaskRepository;
use crate::profile::ProfileRepository;
use crate::shortlist::ShortlistRepository;
use crate::stage::{Stage, StageTracker};
use crate::workflow::{Validator, WorkflowError};

const STATUS_MESSAGE: &str = "must be one of pending, in_progress, completed";
const STAGE_MESSAGE: &str =
    "must be one of STAGE_1_PROFILE, STAGE_2_DISCOVERY, STAGE_3_LOCKING, STAGE_4_APPLICATION";

#[derive(Debug, Clone)]
pub struct TaskService {
    repo: TaskRepository,
    profiles: ProfileRepository,
    shortlists: ShortlistRepository,
    stages: StageTracker,
}

fn parse_stage(v: &mut Validator, raw: Option<&str>) -> Option<Stage> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let parsed = raw.parse::<Stage>().ok();
    v.check(parsed.is_some(), "stage", STAGE_MESSAGE);
    parsed
}

fn parse_status(v: &mut Validator, raw: Option<&str>) -> Option<TaskStatus> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let parsed = raw.parse::<TaskStatus>().ok();
    v.check(parsed.is_some(), "status", STATUS_MESSAGE);
    parsed
}

fn task_not_found() -> anyhow::Error {
    WorkflowError::not_found("Task not found").into()
}

impl TaskService {
    pub fn new(
        repo: TaskRepository,
        profiles: ProfileRepository,
        shortlists: ShortlistRepository,
        stages: StageTracker,
    ) -> Self {
        Self {
            repo,
            profiles,
            shortlists,
            stages,
        }
    }

    /// Create a task, defaulting its stage to the user's current stage.
    #[instrument(skip(self, request))]
    pub async fn create(&self, user_id: &str, request: CreateTaskRequest) -> Result<TaskResponse> {
        let title = request.title.trim();
        let mut v = Validator::new();
        v.length("title", title, 1, 500);
        let stage = parse_stage(&mut v, request.stage.as_deref());
        v.finish()?;

        let stage = match stage {
            Some(stage) => stage,
            None => self.stages.refresh(user_id).await?,
        };

        let task = self.repo.create(user_id, title, stage).await?;
        info!(user_id, task_id = task.id, "Created task");
        Ok(task.into())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: &str, query: TaskListQuery) -> Result<Vec<TaskResponse>> {
        let mut v = Validator::new();
        let stage = parse_stage(&mut v, query.stage.as_deref());
        let status = parse_status(&mut v, query.status.as_deref());
        v.finish()?;

        let tasks = self.repo.list(user_id, stage, status).await?;
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str, id: i64) -> Result<TaskResponse> {
        self.repo
            .get(user_id, id)
            .await?
            .map(TaskResponse::from)
            .ok_or_else(task_not_found)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: &str,
        id: i64,
        request: UpdateTaskRequest,
    ) -> Result<TaskResponse> {
        let title = request.title.as_deref().map(str::trim);
        let mut v = Validator::new();
        if let Some(title) = title {
            v.length("title", title, 1, 500);
        }
        let status = match request.status.as_deref() {
            Some(raw) => {
                let parsed = raw.parse::<TaskStatus>().ok();
                v.check(parsed.is_some(), "status", STATUS_MESSAGE);
                parsed
            }
            None => None,
        };
        v.finish()?;

        let task = self
            .repo
            .update(user_id, id, title, status)
            .await?
            .ok_or_else(task_not_found)?;

        info!(user_id, task_id = id, status = %task.status, "Updated task");
        Ok(task.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, id: i64) -> Result<()> {
        if !self.repo.delete(user_id, id).await? {
            return Err(task_not_found());
        }
        info!(user_id, task_id = id, "Deleted task");
        Ok(())
    }

    /// Create the built-in tasks for every stage up to the current one.
    ///
    /// Titles the user already has are skipped, as are readiness tasks whose
    /// profile status is "Completed". Each locked university adds a
    /// "Submit application to ..." task.
    #[instrument(skip(self))]
    pub async fn generate_defaults(&self, user_id: &str) -> Result<GenerateTasksResponse> {
        let current = self.stages.refresh(user_id).await?;
        let profile = self.profiles.get(user_id).await?;
        let mut existing = self.repo.titles(user_id).await?;

        let mut planned: Vec<(String, Stage)> = applicable(current, profile.as_ref())
            .map(|t| (t.title.to_string(), t.stage))
            .collect();

        if current == Stage::Application {
            for entry in self.shortlists.list(user_id, true).await? {
                planned.push((
                    application_title(&entry.university_name),
                    Stage::Application,
                ));
            }
        }

        let mut created = Vec::new();
        for (title, stage) in planned {
            if !existing.insert(title.clone()) {
                continue;
            }
            created.push(TaskResponse::from(
                self.repo.create(user_id, &title, stage).await?,
            ));
        }

        info!(user_id, count = created.len(), stage = %current, "Generated default tasks");

        let message = if created.is_empty() {
            "All recommended tasks are already on your list".to_string()
        } else {
            format!("Generated {} tasks for {}", created.len(), current.display_name())
        };

        Ok(GenerateTasksResponse {
            message,
            created_count: created.len(),
            tasks: created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> (TaskService, sqlx::SqlitePool) {
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool().clone();
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, onboarding_completed) VALUES ('u1', 'A', 'a@example.com', 'x', 1), ('u2', 'B', 'b@example.com', 'x', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO profiles (user_id, gre_status) VALUES ('u1', 'Completed')")
            .execute(&pool)
            .await
            .unwrap();
        let service = TaskService::new(
            TaskRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            ShortlistRepository::new(pool.clone()),
            StageTracker::new(pool.clone()),
        );
        (service, pool)
    }

    fn kind(err: &anyhow::Error) -> &WorkflowError {
        err.downcast_ref::<WorkflowError>().expect("workflow error")
    }

    #[tokio::test]
    async fn test_create_defaults_to_current_stage() {
        let (service, _) = setup().await;
        let task = service
            .create(
                "u1",
                CreateTaskRequest {
                    title: "  Call the bank ".into(),
                    stage: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(task.title, "Call the bank");
        assert_eq!(task.stage, Stage::Discovery);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, _) = setup().await;
        let err = service
            .create(
                "u1",
                CreateTaskRequest {
                    title: " ".into(),
                    stage: Some("STAGE_9".into()),
                },
            )
            .await
            .unwrap_err();
        match kind(&err) {
            WorkflowError::Validation(fields) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_are_user_scoped() {
        let (service, _) = setup().await;
        let task = service
            .create(
                "u1",
                CreateTaskRequest {
                    title: "Mine".into(),
                    stage: None,
                },
            )
            .await
            .unwrap();

        let err = service.get("u2", task.id).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::NotFound(_)));
        let err = service.delete("u2", task.id).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::NotFound(_)));

        let updated = service
            .update(
                "u1",
                task.id,
                UpdateTaskRequest {
                    title: None,
                    status: Some("completed".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "Mine");

        let err = service
            .update(
                "u1",
                task.id,
                UpdateTaskRequest {
                    title: None,
                    status: Some("done".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Validation(_)));

        let done = service
            .list(
                "u1",
                TaskListQuery {
                    status: Some("completed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(done.len(), 1);

        service.delete("u1", task.id).await.unwrap();
        assert!(service.list("u1", TaskListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_defaults_is_idempotent() {
        let (service, _) = setup().await;
        let first = service.generate_defaults("u1").await.unwrap();
        assert!(first.created_count > 0);
        assert!(first.tasks.iter().all(|t| t.stage <= Stage::Discovery));
        // GRE is already completed on the profile.
        assert!(!first.tasks.iter().any(|t| t.title.contains("GRE")));

        let second = service.generate_defaults("u1").await.unwrap();
        assert_eq!(second.created_count, 0);
    }

    #[tokio::test]
    async fn test_generate_defaults_adds_application_tasks() {
        let (service, pool) = setup().await;
        sqlx::query(
            "INSERT INTO shortlists (user_id, university_id, category, locked) VALUES ('u1', 1, 'Dream', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = service.generate_defaults("u1").await.unwrap();
        assert!(result.tasks.iter().any(|t| {
            t.title == "Submit application to Massachusetts Institute of Technology"
                && t.stage == Stage::Application
        }));
    }
}
