//! Shortlist business logic.

use anyhow::Result;
use tracing::{info, instrument};

use super::models::{
    LockResponse, RemoveResponse, ShortlistRequest, ShortlistResponse, ShortlistedList,
    ShortlistedUniversity,
};
use super::repository::ShortlistRepository;
use crate::catalog::{Category, UniversityRepository, recommend};
use crate::profile::ProfileRepository;
use crate::stage::{Stage, StageTracker};
use crate::workflow::{FieldError, WorkflowError};

#[derive(Debug, Clone)]
pub struct ShortlistService {
    repo: ShortlistRepository,
    universities: UniversityRepository,
    profiles: ProfileRepository,
    stages: StageTracker,
}

impl ShortlistService {
    pub fn new(
        repo: ShortlistRepository,
        universities: UniversityRepository,
        profiles: ProfileRepository,
        stages: StageTracker,
    ) -> Self {
        Self {
            repo,
            universities,
            profiles,
            stages,
        }
    }

    /// Add a university to the user's shortlist.
    #[instrument(skip(self, request), fields(university_id = request.university_id))]
    pub async fn shortlist(
        &self,
        user_id: &str,
        request: ShortlistRequest,
    ) -> Result<ShortlistResponse> {
        if !self.profiles.onboarding_completed(user_id).await? {
            return Err(WorkflowError::forbidden(
                "Please complete onboarding before shortlisting universities",
            )
            .into());
        }

        let university = self
            .universities
            .get(request.university_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("University not found"))?;

        let category = match request.category.as_deref() {
            Some(raw) => raw.parse::<Category>().map_err(|_| {
                WorkflowError::Validation(vec![FieldError::new(
                    "category",
                    "must be one of Dream, Target, Safe",
                )])
            })?,
            None => match self.profiles.get(user_id).await? {
                Some(profile) => recommend::category_for(&profile, &university),
                None => Category::Target,
            },
        };

        if !self.repo.insert(user_id, university.id, category).await? {
            return Err(WorkflowError::conflict("University already shortlisted").into());
        }

        let new_stage = self.stages.refresh(user_id).await?;
        info!(user_id, university_id = university.id, %category, "Shortlisted university");

        Ok(ShortlistResponse {
            message: "University shortlisted successfully".to_string(),
            university_id: university.id,
            university_name: university.name,
            category,
            new_stage,
        })
    }

    /// All shortlisted universities with counts.
    #[instrument(skip(self))]
    pub async fn shortlisted(&self, user_id: &str) -> Result<ShortlistedList> {
        Ok(self.repo.list(user_id, false).await?.into())
    }

    /// Locked universities only.
    #[instrument(skip(self))]
    pub async fn locked(&self, user_id: &str) -> Result<ShortlistedList> {
        Ok(self.repo.list(user_id, true).await?.into())
    }

    async fn require_entry(&self, user_id: &str, university_id: i64) -> Result<ShortlistedUniversity> {
        self.repo
            .get(user_id, university_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::not_found("University is not in your shortlist. Shortlist it first.")
                    .into()
            })
    }

    /// Commit to a shortlisted university.
    #[instrument(skip(self))]
    pub async fn lock(&self, user_id: &str, university_id: i64) -> Result<LockResponse> {
        if !self.repo.set_locked(user_id, university_id, true).await? {
            self.require_entry(user_id, university_id).await?;
            return Err(WorkflowError::invalid("University already locked").into());
        }

        let entry = self.require_entry(user_id, university_id).await?;
        let new_stage = self.stages.refresh(user_id).await?;
        info!(user_id, university_id, "Locked university");

        Ok(LockResponse {
            message: format!("{} locked. You can now prepare your application.", entry.university_name),
            university_id,
            university_name: entry.university_name,
            new_stage,
            warning: None,
        })
    }

    /// Release a lock. Warns when no locked universities remain.
    #[instrument(skip(self))]
    pub async fn unlock(&self, user_id: &str, university_id: i64) -> Result<LockResponse> {
        if !self.repo.set_locked(user_id, university_id, false).await? {
            self.require_entry(user_id, university_id).await?;
            return Err(WorkflowError::invalid("University is not locked").into());
        }

        let entry = self.require_entry(user_id, university_id).await?;
        let new_stage = self.stages.refresh(user_id).await?;
        info!(user_id, university_id, "Unlocked university");

        let warning = (new_stage < Stage::Application).then(|| {
            format!(
                "No universities are locked anymore. You are back in the '{}' stage and application tasks are on hold.",
                new_stage.display_name()
            )
        });

        Ok(LockResponse {
            message: format!("{} unlocked.", entry.university_name),
            university_id,
            university_name: entry.university_name,
            new_stage,
            warning,
        })
    }

    /// Remove an unlocked university from the shortlist.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: &str, university_id: i64) -> Result<RemoveResponse> {
        if !self.repo.remove_unlocked(user_id, university_id).await? {
            self.require_entry(user_id, university_id).await?;
            return Err(WorkflowError::invalid(
                "Cannot remove a locked university. Unlock it first.",
            )
            .into());
        }

        let new_stage = self.stages.refresh(user_id).await?;
        info!(user_id, university_id, "Removed university from shortlist");

        Ok(RemoveResponse {
            message: "University removed from shortlist".to_string(),
            university_id,
            new_stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup(onboarded: bool) -> ShortlistService {
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool().clone();
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, onboarding_completed) VALUES ('u1', 'A', 'a@example.com', 'x', ?)",
        )
        .bind(onboarded)
        .execute(&pool)
        .await
        .unwrap();
        if onboarded {
            sqlx::query("INSERT INTO profiles (user_id, budget_range) VALUES ('u1', '0-30000')")
                .execute(&pool)
                .await
                .unwrap();
        }
        ShortlistService::new(
            ShortlistRepository::new(pool.clone()),
            UniversityRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            StageTracker::new(pool),
        )
    }

    fn request(id: i64) -> ShortlistRequest {
        ShortlistRequest {
            university_id: id,
            category: None,
        }
    }

    fn kind(err: &anyhow::Error) -> &WorkflowError {
        err.downcast_ref::<WorkflowError>().expect("workflow error")
    }

    #[tokio::test]
    async fn test_requires_onboarding() {
        let service = setup(false).await;
        let err = service.shortlist("u1", request(1)).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_full_lock_cycle() {
        let service = setup(true).await;

        let res = service.shortlist("u1", request(1)).await.unwrap();
        assert_eq!(res.new_stage, Stage::Locking);
        // MIT costs well above a 30000 budget.
        assert_eq!(res.category, Category::Dream);

        let err = service.shortlist("u1", request(1)).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Conflict(_)));

        let locked = service.lock("u1", 1).await.unwrap();
        assert_eq!(locked.new_stage, Stage::Application);
        let err = service.lock("u1", 1).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Invalid(_)));

        // Locked entries cannot be removed.
        let err = service.remove("u1", 1).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Invalid(_)));
        assert_eq!(service.locked("u1").await.unwrap().total, 1);

        let unlocked = service.unlock("u1", 1).await.unwrap();
        assert_eq!(unlocked.new_stage, Stage::Locking);
        assert!(unlocked.warning.is_some());
        let err = service.unlock("u1", 1).await.unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Invalid(_)));

        let removed = service.remove("u1", 1).await.unwrap();
        assert_eq!(removed.new_stage, Stage::Discovery);
        assert_eq!(service.shortlisted("u1").await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_missing_entries_are_not_found() {
        let service = setup(true).await;
        for err in [
            service.lock("u1", 2).await.unwrap_err(),
            service.unlock("u1", 2).await.unwrap_err(),
            service.remove("u1", 2).await.unwrap_err(),
            service.shortlist("u1", request(9999)).await.unwrap_err(),
        ] {
            assert!(matches!(kind(&err), WorkflowError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn test_explicit_and_invalid_category() {
        let service = setup(true).await;
        let res = service
            .shortlist(
                "u1",
                ShortlistRequest {
                    university_id: 2,
                    category: Some("safe".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(res.category, Category::Safe);

        let err = service
            .shortlist(
                "u1",
                ShortlistRequest {
                    university_id: 3,
                    category: Some("Reach".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(kind(&err), WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unlock_keeps_application_with_other_locks() {
        let service = setup(true).await;
        service.shortlist("u1", request(1)).await.unwrap();
        service.shortlist("u1", request(2)).await.unwrap();
        service.lock("u1", 1).await.unwrap();
        service.lock("u1", 2).await.unwrap();

        let res = service.unlock("u1", 1).await.unwrap();
        assert_eq!(res.new_stage, Stage::Application);
        assert!(res.warning.is_none());

        let list = service.shortlisted("u1").await.unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.locked_count, 1);
    }
}
