//! University repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{NewUniversity, University, UniversityQuery, UniversityRow};
use super::recommend::offers_field;

const SELECT_UNIVERSITY: &str =
    "SELECT id, name, country, avg_cost, difficulty, fields FROM universities";

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Repository for the university catalog.
#[derive(Debug, Clone)]
pub struct UniversityRepository {
    pool: SqlitePool,
}

impl UniversityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a university by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<University>> {
        let row = sqlx::query_as::<_, UniversityRow>(&format!("{SELECT_UNIVERSITY} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch university")?;

        Ok(row.map(University::from))
    }

    /// Every university, cheapest first.
    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Vec<University>> {
        self.list(&UniversityQuery::default()).await
    }

    /// List universities with optional filters.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &UniversityQuery) -> Result<Vec<University>> {
        let mut sql = format!("{SELECT_UNIVERSITY} WHERE 1=1");
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(country) = query.country.as_deref().filter(|c| !c.trim().is_empty()) {
            sql.push_str(" AND country = ? COLLATE NOCASE");
            bind_values.push(country.trim().to_string());
        }

        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            bind_values.push(format!("%{}%", escape_like(search.trim())));
        }

        if query.max_cost.is_some() {
            sql.push_str(" AND avg_cost <= ?");
        }

        sql.push_str(" ORDER BY avg_cost ASC, name ASC");

        let mut query_builder = sqlx::query_as::<_, UniversityRow>(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }
        if let Some(max_cost) = query.max_cost {
            query_builder = query_builder.bind(max_cost);
        }

        let rows = query_builder
            .fetch_all(&self.pool)
            .await
            .context("Failed to list universities")?;

        // Field keywords are matched against the JSON list in Rust.
        let field = query.field.as_deref().filter(|f| !f.trim().is_empty());
        Ok(rows
            .into_iter()
            .map(University::from)
            .filter(|uni| field.is_none_or(|f| offers_field(uni, f)))
            .collect())
    }

    /// Insert a university, or update the existing one with the same name.
    #[instrument(skip(self, university), fields(name = %university.name))]
    pub async fn upsert(&self, university: &NewUniversity) -> Result<i64> {
        let fields =
            serde_json::to_string(&university.fields).context("Failed to encode fields")?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO universities (name, country, avg_cost, difficulty, fields)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                country = excluded.country,
                avg_cost = excluded.avg_cost,
                difficulty = excluded.difficulty,
                fields = excluded.fields
            RETURNING id
            "#,
        )
        .bind(&university.name)
        .bind(&university.country)
        .bind(university.avg_cost)
        .bind(university.difficulty.to_string())
        .bind(fields)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert university")?;

        debug!("Upserted university {} ({})", university.name, id);
        Ok(id)
    }

    /// Number of universities in the catalog.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM universities")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count universities")?;
        Ok(count)
    }
}
