//! Task repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::models::{Task, TaskStatus};
use crate::stage::Stage;

const SELECT_TASK: &str =
    "SELECT id, user_id, title, stage, status, created_at, updated_at FROM tasks";

/// Repository for task database operations. Every query is scoped to a user.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, title))]
    pub async fn create(&self, user_id: &str, title: &str, stage: Stage) -> Result<Task> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO tasks (user_id, title, stage, status) VALUES (?, ?, ?, 'pending') RETURNING id",
        )
        .bind(user_id)
        .bind(title)
        .bind(stage.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert task")?;

        debug!("Created task {} for {}", id, user_id);

        self.get(user_id, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Task not found after creation"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str, id: i64) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!("{SELECT_TASK} WHERE user_id = ? AND id = ?"))
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch task")?;

        Ok(task)
    }

    /// List a user's tasks in creation order.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: &str,
        stage: Option<Stage>,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>> {
        let mut sql = format!("{SELECT_TASK} WHERE user_id = ?");
        if stage.is_some() {
            sql.push_str(" AND stage = ?");
        }
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(user_id);
        if let Some(stage) = stage {
            query = query.bind(stage.as_str());
        }
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        let tasks = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tasks")?;

        Ok(tasks)
    }

    /// Titles the user already has, for de-duplicating generated tasks.
    #[instrument(skip(self))]
    pub async fn titles(&self, user_id: &str) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT title FROM tasks WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list task titles")?;

        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    /// Update title and/or status. Returns `None` when the task does not exist.
    #[instrument(skip(self, title))]
    pub async fn update(
        &self,
        user_id: &str,
        id: i64,
        title: Option<&str>,
        status: Option<TaskStatus>,
    ) -> Result<Option<Task>> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = COALESCE(?, title),
                status = COALESCE(?, status),
                updated_at = datetime('now')
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(title)
        .bind(status.map(TaskStatus::as_str))
        .bind(user_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update task")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(user_id, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete task")?;

        Ok(result.rows_affected() > 0)
    }
}
