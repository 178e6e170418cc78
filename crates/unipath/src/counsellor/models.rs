//! Counsellor request, plan and response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/ai/counsellor`.
#[derive(Debug, Clone, Deserialize)]
pub struct CounsellorRequest {
    pub message: String,
}

/// What the user is asking for. Unrecognized names read as general help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Intent {
    RecommendUniversities,
    ShortlistUniversity,
    LockUniversity,
    CreateTasks,
    #[default]
    GeneralHelp,
}

impl From<String> for Intent {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "recommend_universities" => Intent::RecommendUniversities,
            "shortlist_university" => Intent::ShortlistUniversity,
            "lock_university" => Intent::LockUniversity,
            "create_tasks" => Intent::CreateTasks,
            _ => Intent::GeneralHelp,
        }
    }
}

/// An action proposed by a model. Nothing here is trusted until validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannedAction {
    Shortlist {
        #[serde(default)]
        university_id: Option<i64>,
        #[serde(default)]
        category: Option<String>,
    },
    Lock {
        #[serde(default)]
        university_id: Option<i64>,
    },
    CreateTask {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        stage: Option<String>,
    },
    GenerateTasks,
    #[serde(other)]
    Unknown,
}

impl PlannedAction {
    pub fn kind(&self) -> &'static str {
        match self {
            PlannedAction::Shortlist { .. } => "shortlist",
            PlannedAction::Lock { .. } => "lock",
            PlannedAction::CreateTask { .. } => "create_task",
            PlannedAction::GenerateTasks => "generate_tasks",
            PlannedAction::Unknown => "unknown",
        }
    }
}

/// A model's answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub explanation: String,
    /// University IDs per bucket, as chosen by the model.
    #[serde(default)]
    pub recommendations: Option<serde_json::Value>,
    #[serde(default)]
    pub actions: Vec<PlannedAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Executed,
    Skipped,
    Failed,
}

/// Outcome of one planned action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ActionStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
}

impl ActionResult {
    pub fn new(kind: &str, status: ActionStatus, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            status,
            message: message.into(),
            university_id: None,
            task_id: None,
        }
    }

    pub fn university(mut self, id: i64) -> Self {
        self.university_id = Some(id);
        self
    }

    pub fn task(mut self, id: i64) -> Self {
        self.task_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CounsellorResponse {
    pub intent: Intent,
    pub reply: String,
    pub recommendations: Option<serde_json::Value>,
    pub actions: Vec<ActionResult>,
    pub model: String,
}
