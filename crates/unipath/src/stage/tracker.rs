//! Loads stage facts from the store and keeps the cached stage column fresh.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use super::models::{Stage, StageFacts};
use crate::workflow::WorkflowError;

/// Stage snapshot returned by `GET /api/stage` and embedded in the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StageInfo {
    pub current_stage: Stage,
    pub stored_stage: Stage,
    pub calculated_stage: Stage,
    pub needs_update: bool,
    pub display_name: &'static str,
    pub next_stage: Option<Stage>,
    pub onboarding_completed: bool,
    pub shortlist_count: i64,
    pub locked_count: i64,
}

/// Derives and caches user stages.
#[derive(Debug, Clone)]
pub struct StageTracker {
    pool: SqlitePool,
}

impl StageTracker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the facts the stage is derived from.
    #[instrument(skip(self))]
    pub async fn facts(&self, user_id: &str) -> Result<StageFacts> {
        let onboarding_completed: Option<(bool,)> =
            sqlx::query_as("SELECT onboarding_completed FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch onboarding flag")?;

        let Some((onboarding_completed,)) = onboarding_completed else {
            return Err(WorkflowError::not_found("User not found").into());
        };

        let (shortlist_count, locked_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN locked THEN 1 ELSE 0 END), 0)
            FROM shortlists
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count shortlist entries")?;

        Ok(StageFacts::new(
            onboarding_completed,
            shortlist_count,
            locked_count,
        ))
    }

    async fn stored(&self, user_id: &str) -> Result<Stage> {
        let (raw,): (String,) = sqlx::query_as("SELECT current_stage FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch stored stage")?
            .ok_or_else(|| WorkflowError::not_found("User not found"))?;

        // An unreadable cache value is treated as the first stage; the next
        // refresh overwrites it.
        Ok(raw.parse().unwrap_or_default())
    }

    /// Recompute the stage and write it back when it changed.
    #[instrument(skip(self))]
    pub async fn refresh(&self, user_id: &str) -> Result<Stage> {
        let facts = self.facts(user_id).await?;
        let calculated = Stage::derive(facts);
        let stored = self.stored(user_id).await?;

        if stored != calculated {
            sqlx::query(
                "UPDATE users SET current_stage = ?, updated_at = datetime('now') WHERE id = ?",
            )
            .bind(calculated.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to update stage")?;

            info!(
                user_id,
                from = %stored,
                to = %calculated,
                "Stage transition"
            );
        } else {
            debug!(user_id, stage = %calculated, "Stage unchanged");
        }

        Ok(calculated)
    }

    /// Report stored and calculated stage without writing anything.
    #[instrument(skip(self))]
    pub async fn info(&self, user_id: &str) -> Result<StageInfo> {
        let facts = self.facts(user_id).await?;
        let stored = self.stored(user_id).await?;
        Ok(build_info(stored, facts))
    }

    /// Refresh the cache if stale, then report.
    #[instrument(skip(self))]
    pub async fn refreshed_info(&self, user_id: &str) -> Result<StageInfo> {
        let current = self.refresh(user_id).await?;
        let facts = self.facts(user_id).await?;
        Ok(build_info(current, facts))
    }
}

fn build_info(stored: Stage, facts: StageFacts) -> StageInfo {
    let calculated = Stage::derive(facts);
    StageInfo {
        current_stage: calculated,
        stored_stage: stored,
        calculated_stage: calculated,
        needs_update: stored != calculated,
        display_name: calculated.display_name(),
        next_stage: calculated.next(),
        onboarding_completed: facts.onboarding_completed,
        shortlist_count: facts.shortlist_count,
        locked_count: facts.locked_count,
    }
}
