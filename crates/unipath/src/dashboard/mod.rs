//! Aggregated home-screen view.

use anyhow::Result;
use serde::Serialize;
use tracing::instrument;

use crate::profile::{Profile, ProfileRepository};
use crate::shortlist::{ShortlistRepository, ShortlistedUniversity};
use crate::stage::{StageInfo, StageTracker};
use crate::tasks::{TaskRepository, TaskResponse};

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub profile: Option<Profile>,
    pub stage: StageInfo,
    pub tasks: Vec<TaskResponse>,
    pub shortlisted_universities: Vec<ShortlistedUniversity>,
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    profiles: ProfileRepository,
    stages: StageTracker,
    tasks: TaskRepository,
    shortlists: ShortlistRepository,
}

impl DashboardService {
    pub fn new(
        profiles: ProfileRepository,
        stages: StageTracker,
        tasks: TaskRepository,
        shortlists: ShortlistRepository,
    ) -> Self {
        Self {
            profiles,
            stages,
            tasks,
            shortlists,
        }
    }

    /// Build the dashboard. A stale cached stage is refreshed first.
    #[instrument(skip(self))]
    pub async fn load(&self, user_id: &str) -> Result<Dashboard> {
        let stage = self.stages.refreshed_info(user_id).await?;
        let profile = self.profiles.get(user_id).await?;
        let tasks = self.tasks.list(user_id, None, None).await?;
        let shortlisted_universities = self.shortlists.list(user_id, false).await?;

        Ok(Dashboard {
            profile,
            stage,
            tasks: tasks.into_iter().map(TaskResponse::from).collect(),
            shortlisted_universities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::stage::Stage;

    #[tokio::test]
    async fn test_dashboard_refreshes_stale_stage() {
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool().clone();
        // Cached stage says PROFILE, facts say LOCKING.
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, onboarding_completed) VALUES ('u1', 'A', 'a@example.com', 'x', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO shortlists (user_id, university_id, category) VALUES ('u1', 3, 'Safe')")
            .execute(&pool)
            .await
            .unwrap();

        let service = DashboardService::new(
            ProfileRepository::new(pool.clone()),
            StageTracker::new(pool.clone()),
            TaskRepository::new(pool.clone()),
            ShortlistRepository::new(pool.clone()),
        );
        let dashboard = service.load("u1").await.unwrap();

        assert!(dashboard.profile.is_none());
        assert_eq!(dashboard.stage.current_stage, Stage::Locking);
        assert!(!dashboard.stage.needs_update);
        assert_eq!(dashboard.shortlisted_universities.len(), 1);
        assert!(dashboard.tasks.is_empty());

        let (cached,): (String,) = sqlx::query_as("SELECT current_stage FROM users WHERE id = 'u1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(cached, "STAGE_3_LOCKING");
    }
}
