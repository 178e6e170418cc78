//! Stage enumeration and the derivation rule.

use serde::{Deserialize, Serialize};

/// Guided-workflow stage.
///
/// Users move through these in order:
/// 1. Profile - onboarding not finished
/// 2. Discovery - onboarding done, nothing shortlisted
/// 3. Locking - universities shortlisted, none locked
/// 4. Application - at least one university locked
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Stage {
    #[default]
    #[serde(rename = "STAGE_1_PROFILE")]
    Profile,
    #[serde(rename = "STAGE_2_DISCOVERY")]
    Discovery,
    #[serde(rename = "STAGE_3_LOCKING")]
    Locking,
    #[serde(rename = "STAGE_4_APPLICATION")]
    Application,
}

impl Stage {
    /// All stages in progression order.
    pub const ALL: [Stage; 4] = [
        Stage::Profile,
        Stage::Discovery,
        Stage::Locking,
        Stage::Application,
    ];

    /// Derive the stage from persisted facts.
    ///
    /// Each fact can only move the result forward, so the function is
    /// monotonic in every input.
    pub fn derive(facts: StageFacts) -> Stage {
        let mut stage = Stage::Profile;
        if facts.onboarding_completed {
            stage = Stage::Discovery;
        }
        if stage == Stage::Discovery && facts.shortlist_count > 0 {
            stage = Stage::Locking;
        }
        if stage == Stage::Locking && facts.locked_count > 0 {
            stage = Stage::Application;
        }
        stage
    }

    /// Wire name, as stored and returned by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Profile => "STAGE_1_PROFILE",
            Stage::Discovery => "STAGE_2_DISCOVERY",
            Stage::Locking => "STAGE_3_LOCKING",
            Stage::Application => "STAGE_4_APPLICATION",
        }
    }

    /// Human-readable name for the frontend.
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::Profile => "Building Profile",
            Stage::Discovery => "Discovering Universities",
            Stage::Locking => "Finalizing Universities",
            Stage::Application => "Preparing Applications",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Stage::ALL[i])
    }

    /// Users may revisit their current stage or any earlier one, never skip ahead.
    pub fn can_access(self, required: Stage) -> bool {
        required <= self
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STAGE_1_PROFILE" => Ok(Stage::Profile),
            "STAGE_2_DISCOVERY" => Ok(Stage::Discovery),
            "STAGE_3_LOCKING" => Ok(Stage::Locking),
            "STAGE_4_APPLICATION" => Ok(Stage::Application),
            _ => Err(format!("Invalid stage: {}", s)),
        }
    }
}

impl TryFrom<String> for Stage {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The persisted facts a stage is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StageFacts {
    pub onboarding_completed: bool,
    pub shortlist_count: i64,
    pub locked_count: i64,
}

impl StageFacts {
    pub fn new(onboarding_completed: bool, shortlist_count: i64, locked_count: i64) -> Self {
        Self {
            onboarding_completed,
            shortlist_count,
            locked_count,
        }
    }
}
