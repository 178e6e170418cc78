//! University data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Admission difficulty of a university.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Low => write!(f, "Low"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Difficulty::Low),
            "medium" => Ok(Difficulty::Medium),
            "high" => Ok(Difficulty::High),
            _ => Err(format!("Invalid difficulty: {}", s)),
        }
    }
}

/// Recommendation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Dream,
    Target,
    Safe,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Dream => "Dream",
            Category::Target => "Target",
            Category::Safe => "Safe",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dream" => Ok(Category::Dream),
            "target" => Ok(Category::Target),
            "safe" => Ok(Category::Safe),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Risk {
    Low,
    Medium,
    High,
}

/// University from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct University {
    pub id: i64,
    pub name: String,
    pub country: String,
    /// Average yearly cost (tuition plus living).
    pub avg_cost: i64,
    pub difficulty: Difficulty,
    pub fields: Vec<String>,
}

/// Row shape: `fields` is stored as a JSON array.
#[derive(Debug, FromRow)]
pub(crate) struct UniversityRow {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub avg_cost: i64,
    pub difficulty: String,
    pub fields: String,
}

impl From<UniversityRow> for University {
    fn from(row: UniversityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            country: row.country,
            avg_cost: row.avg_cost,
            difficulty: row.difficulty.parse().unwrap_or_default(),
            fields: serde_json::from_str(&row.fields).unwrap_or_default(),
        }
    }
}

/// Catalog entry to insert or update (matched by name).
#[derive(Debug, Clone, Deserialize)]
pub struct NewUniversity {
    pub name: String,
    pub country: String,
    pub avg_cost: i64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Filters for `GET /api/universities`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversityQuery {
    pub country: Option<String>,
    pub field: Option<String>,
    pub max_cost: Option<i64>,
    pub search: Option<String>,
}
