//! Shortlist repository.
//!
//! State changes are conditional updates so concurrent requests resolve at
//! the store: lock only matches unlocked rows, unlock only locked rows, and
//! delete only unlocked rows.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::ShortlistedUniversity;
use crate::catalog::Category;

const SELECT_SHORTLISTED: &str = r#"
    SELECT s.university_id, u.name AS university_name, u.country, u.avg_cost,
           u.difficulty, s.category, s.locked, s.created_at
    FROM shortlists s
    JOIN universities u ON u.id = s.university_id
    WHERE s.user_id = ?
"#;

#[derive(Debug, Clone)]
pub struct ShortlistRepository {
    pool: SqlitePool,
}

impl ShortlistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str, university_id: i64) -> Result<Option<ShortlistedUniversity>> {
        let entry = sqlx::query_as::<_, ShortlistedUniversity>(&format!(
            "{SELECT_SHORTLISTED} AND s.university_id = ?"
        ))
        .bind(user_id)
        .bind(university_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch shortlist entry")?;

        Ok(entry)
    }

    /// List a user's shortlist, optionally only locked entries.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: &str, locked_only: bool) -> Result<Vec<ShortlistedUniversity>> {
        let filter = if locked_only { " AND s.locked = 1" } else { "" };
        let entries = sqlx::query_as::<_, ShortlistedUniversity>(&format!(
            "{SELECT_SHORTLISTED}{filter} ORDER BY s.created_at ASC, u.name ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list shortlist")?;

        Ok(entries)
    }

    /// Insert an entry. Returns false when it already exists.
    #[instrument(skip(self))]
    pub async fn insert(&self, user_id: &str, university_id: i64, category: Category) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO shortlists (user_id, university_id, category, locked)
            VALUES (?, ?, ?, 0)
            ON CONFLICT(user_id, university_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(university_id)
        .bind(category.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to insert shortlist entry")?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the locked flag. Returns false when no row changed.
    #[instrument(skip(self))]
    pub async fn set_locked(&self, user_id: &str, university_id: i64, locked: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE shortlists SET locked = ? WHERE user_id = ? AND university_id = ? AND locked = ?",
        )
        .bind(locked)
        .bind(user_id)
        .bind(university_id)
        .bind(!locked)
        .execute(&self.pool)
        .await
        .context("Failed to update lock state")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an unlocked entry. Returns false when nothing was deleted.
    #[instrument(skip(self))]
    pub async fn remove_unlocked(&self, user_id: &str, university_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM shortlists WHERE user_id = ? AND university_id = ? AND locked = 0",
        )
        .bind(user_id)
        .bind(university_id)
        .execute(&self.pool)
        .await
        .context("Failed to remove shortlist entry")?;

        Ok(result.rows_affected() > 0)
    }
}
