//! JWT claims.

use serde::{Deserialize, Serialize};

/// Token issuer written into every session token.
pub const ISSUER: &str = "unipath";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,

    /// Issued at (as Unix timestamp).
    #[serde(default)]
    pub iat: Option<i64>,

    /// User's email.
    #[serde(default)]
    pub email: Option<String>,

    /// User's name.
    #[serde(default)]
    pub name: Option<String>,
}

impl Claims {
    /// Get the display name (name, then email, then subject).
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut claims = Claims {
            sub: "user-1".to_string(),
            iss: None,
            exp: 0,
            iat: None,
            email: Some("a@example.com".to_string()),
            name: None,
        };
        assert_eq!(claims.display_name(), "a@example.com");
        claims.email = None;
        assert_eq!(claims.display_name(), "user-1");
        claims.name = Some("Asha".to_string());
        assert_eq!(claims.display_name(), "Asha");
    }

    #[test]
    fn test_claims_deserialize_minimal() {
        let claims: Claims = serde_json::from_str(r#"{"sub":"u","exp":1}"#).unwrap();
        assert_eq!(claims.sub, "u");
        assert!(claims.iss.is_none());
    }
}
