//! Profile repository for database operations.

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

use super::models::{Profile, ProfileRow};

/// Repository for profile database operations.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the profile for a user.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, education_level, major, graduation_year, academic_score,
                   target_degree, field, intake_year, countries, budget_range,
                   funding_type, ielts_status, gre_status, sop_status
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch profile")?;

        Ok(row.map(Profile::from))
    }

    /// Whether the user has finished onboarding.
    #[instrument(skip(self))]
    pub async fn onboarding_completed(&self, user_id: &str) -> Result<bool> {
        let flag: Option<(bool,)> =
            sqlx::query_as("SELECT onboarding_completed FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch onboarding flag")?;
        Ok(flag.is_some_and(|(done,)| done))
    }

    /// Write the profile (insert or replace).
    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub async fn save(&self, profile: &Profile) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        upsert(&mut tx, profile).await?;
        tx.commit().await.context("Failed to commit profile")?;
        Ok(())
    }

    /// Write the profile and mark onboarding complete in one transaction.
    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub async fn complete_onboarding(&self, profile: &Profile) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        upsert(&mut tx, profile).await?;

        sqlx::query(
            "UPDATE users SET onboarding_completed = 1, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(&profile.user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to mark onboarding complete")?;

        tx.commit().await.context("Failed to commit onboarding")?;
        debug!("Onboarding completed for {}", profile.user_id);
        Ok(())
    }
}

async fn upsert(tx: &mut Transaction<'_, Sqlite>, profile: &Profile) -> Result<()> {
    let countries =
        serde_json::to_string(&profile.countries).context("Failed to encode countries")?;

    sqlx::query(
        r#"
        INSERT INTO profiles (
            user_id, education_level, major, graduation_year, academic_score,
            target_degree, field, intake_year, countries, budget_range,
            funding_type, ielts_status, gre_status, sop_status, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))
        ON CONFLICT(user_id) DO UPDATE SET
            education_level = excluded.education_level,
            major = excluded.major,
            graduation_year = excluded.graduation_year,
            academic_score = excluded.academic_score,
            target_degree = excluded.target_degree,
            field = excluded.field,
            intake_year = excluded.intake_year,
            countries = excluded.countries,
            budget_range = excluded.budget_range,
            funding_type = excluded.funding_type,
            ielts_status = excluded.ielts_status,
            gre_status = excluded.gre_status,
            sop_status = excluded.sop_status,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&profile.user_id)
    .bind(&profile.education_level)
    .bind(&profile.major)
    .bind(profile.graduation_year)
    .bind(&profile.academic_score)
    .bind(&profile.target_degree)
    .bind(&profile.field)
    .bind(profile.intake_year)
    .bind(countries)
    .bind(&profile.budget_range)
    .bind(&profile.funding_type)
    .bind(&profile.ielts_status)
    .bind(&profile.gre_status)
    .bind(&profile.sop_status)
    .execute(&mut **tx)
    .await
    .context("Failed to upsert profile")?;

    Ok(())
}
