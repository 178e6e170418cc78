//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::stage::Stage;

/// User entity from database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub onboarding_completed: bool,
    /// Cached stage; see [`crate::stage::StageTracker`].
    #[sqlx(try_from = "String")]
    pub current_stage: Stage,
    pub created_at: String,
    pub updated_at: String,
}

/// Public user info (safe to return to clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub onboarding_completed: bool,
    pub current_stage: Stage,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            onboarding_completed: user.onboarding_completed,
            current_stage: user.current_stage,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_from_user() {
        let user = User {
            id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "secret".to_string(),
            onboarding_completed: true,
            current_stage: Stage::Discovery,
            created_at: "2025-01-01 00:00:00".to_string(),
            updated_at: "2025-01-01 00:00:00".to_string(),
        };

        let info: UserInfo = user.clone().into();
        assert_eq!(info.id, user.id);
        assert_eq!(info.current_stage, Stage::Discovery);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
