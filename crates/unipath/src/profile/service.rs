//! Onboarding business logic.

use anyhow::Result;
use tracing::{info, instrument};

use super::models::{
    OnboardingResponse, OnboardingStatus, Profile, ProfileBrief, ProfileRequest,
};
use super::repository::ProfileRepository;
use crate::stage::StageTracker;
use crate::workflow::{Validator, WorkflowError};

const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1950..=2100;

/// Service for onboarding and profile updates.
#[derive(Debug, Clone)]
pub struct ProfileService {
    repo: ProfileRepository,
    stages: StageTracker,
}

impl ProfileService {
    pub fn new(repo: ProfileRepository, stages: StageTracker) -> Self {
        Self { repo, stages }
    }

    /// Get a user's profile, if onboarding has created one.
    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        self.repo.get(user_id).await
    }

    /// Get a user's profile or reject with a 400-class error.
    pub async fn require(&self, user_id: &str) -> Result<Profile> {
        self.repo.get(user_id).await?.ok_or_else(|| {
            WorkflowError::invalid("Profile not completed. Please complete onboarding first.")
                .into()
        })
    }

    /// Save the profile and finish onboarding.
    #[instrument(skip(self, request))]
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        request: ProfileRequest,
    ) -> Result<OnboardingResponse> {
        if self.repo.onboarding_completed(user_id).await? {
            return Err(WorkflowError::invalid("Onboarding already completed").into());
        }
        validate(&request)?;

        let profile = request.into_profile(user_id);
        self.repo.complete_onboarding(&profile).await?;
        let stage = self.stages.refresh(user_id).await?;

        info!(user_id, stage = %stage, "Onboarding completed");

        Ok(OnboardingResponse {
            message: "Onboarding completed successfully".to_string(),
            onboarding_completed: true,
            current_stage: stage,
            stage_name: stage.display_name(),
        })
    }

    /// Change the provided profile fields.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: ProfileRequest,
    ) -> Result<OnboardingResponse> {
        let mut profile = self.repo.get(user_id).await?.ok_or_else(|| {
            WorkflowError::not_found("Profile not found. Please complete onboarding first.")
        })?;
        validate(&request)?;

        request.apply_to(&mut profile);
        self.repo.save(&profile).await?;
        let stage = self.stages.refresh(user_id).await?;
        let onboarding_completed = self.repo.onboarding_completed(user_id).await?;

        info!(user_id, "Profile updated");

        Ok(OnboardingResponse {
            message: "Profile updated successfully".to_string(),
            onboarding_completed,
            current_stage: stage,
            stage_name: stage.display_name(),
        })
    }

    /// Onboarding flag plus a short profile summary.
    #[instrument(skip(self))]
    pub async fn status(&self, user_id: &str) -> Result<OnboardingStatus> {
        let onboarding_completed = self.repo.onboarding_completed(user_id).await?;
        let profile = self.repo.get(user_id).await?;

        Ok(OnboardingStatus {
            onboarding_completed,
            has_profile: profile.is_some(),
            profile: profile.as_ref().map(ProfileBrief::from),
        })
    }
}

fn validate(request: &ProfileRequest) -> Result<(), WorkflowError> {
    let mut v = Validator::new();
    if let Some(year) = request.graduation_year {
        v.check(
            YEAR_RANGE.contains(&year),
            "graduation_year",
            "must be between 1950 and 2100",
        );
    }
    if let Some(year) = request.intake_year {
        v.check(
            YEAR_RANGE.contains(&year),
            "intake_year",
            "must be between 1950 and 2100",
        );
    }
    if let Some(countries) = &request.countries {
        v.check(
            countries.iter().all(|c| !c.trim().is_empty()),
            "countries",
            "must not contain empty names",
        );
    }
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::stage::Stage;

    async fn service_with_user() -> (ProfileService, Database) {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash) VALUES ('u1', 'A', 'a@example.com', 'x')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let service = ProfileService::new(
            ProfileRepository::new(db.pool().clone()),
            StageTracker::new(db.pool().clone()),
        );
        (service, db)
    }

    #[tokio::test]
    async fn test_complete_onboarding_once() {
        let (service, _db) = service_with_user().await;

        let request = ProfileRequest {
            field: Some("Law".into()),
            countries: Some(vec!["UK".into()]),
            ..Default::default()
        };
        let response = service
            .complete_onboarding("u1", request.clone())
            .await
            .unwrap();
        assert_eq!(response.current_stage, Stage::Discovery);
        assert_eq!(response.stage_name, "Discovering Universities");

        let err = service.complete_onboarding("u1", request).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Invalid(_))
        ));

        let status = service.status("u1").await.unwrap();
        assert!(status.onboarding_completed);
        assert!(status.has_profile);
        assert_eq!(status.profile.unwrap().field.as_deref(), Some("Law"));
    }

    #[tokio::test]
    async fn test_update_requires_profile() {
        let (service, _db) = service_with_user().await;
        let err = service
            .update_profile("u1", ProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let (service, _db) = service_with_user().await;
        service
            .complete_onboarding(
                "u1",
                ProfileRequest {
                    major: Some("Science".into()),
                    budget_range: Some("0-30000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        service
            .update_profile(
                "u1",
                ProfileRequest {
                    budget_range: Some("30000-50000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let profile = service.require("u1").await.unwrap();
        assert_eq!(profile.major.as_deref(), Some("Science"));
        assert_eq!(profile.budget_range.as_deref(), Some("30000-50000"));
    }

    #[tokio::test]
    async fn test_invalid_years_are_reported_per_field() {
        let (service, _db) = service_with_user().await;
        let err = service
            .complete_onboarding(
                "u1",
                ProfileRequest {
                    graduation_year: Some(1800),
                    intake_year: Some(3000),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err.downcast_ref::<WorkflowError>() {
            Some(WorkflowError::Validation(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!service.status("u1").await.unwrap().onboarding_completed);
    }
}
