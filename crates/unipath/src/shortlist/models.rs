//! Shortlist data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::catalog::Category;
use crate::stage::Stage;

/// A shortlist entry joined with its university.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShortlistedUniversity {
    pub university_id: i64,
    pub university_name: String,
    pub country: String,
    pub avg_cost: i64,
    pub difficulty: String,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub locked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortlistRequest {
    pub university_id: i64,
    /// Dream, Target or Safe. Derived from the profile when omitted.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockRequest {
    pub university_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortlistResponse {
    pub message: String,
    pub university_id: i64,
    pub university_name: String,
    pub category: Category,
    pub new_stage: Stage,
}

#[derive(Debug, Clone, Serialize)]
pub struct LockResponse {
    pub message: String,
    pub university_id: i64,
    pub university_name: String,
    pub new_stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    pub message: String,
    pub university_id: i64,
    pub new_stage: Stage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortlistedList {
    pub universities: Vec<ShortlistedUniversity>,
    pub total: usize,
    pub locked_count: usize,
}

impl From<Vec<ShortlistedUniversity>> for ShortlistedList {
    fn from(universities: Vec<ShortlistedUniversity>) -> Self {
        let locked_count = universities.iter().filter(|u| u.locked).count();
        Self {
            total: universities.len(),
            locked_count,
            universities,
        }
    }
}
