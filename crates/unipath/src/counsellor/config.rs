//! Counsellor model configuration.

use serde::{Deserialize, Serialize};

/// Which model answers counsellor messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Deterministic keyword routing, no network access.
    #[default]
    Rules,
    /// Google Gemini `generateContent`.
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounsellorConfig {
    pub provider: Provider,
    /// API key for the remote provider. Literal value or `env:VAR_NAME`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for CounsellorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Rules,
            api_key: Some("env:GEMINI_API_KEY".to_string()),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
            temperature: 0.2,
        }
    }
}

impl CounsellorConfig {
    /// Resolve the API key, expanding `env:VAR_NAME` syntax.
    /// Unset or empty variables resolve to `None`.
    pub fn resolve_api_key(&self) -> Option<String> {
        let value = self.api_key.as_deref()?;
        match value.strip_prefix("env:") {
            Some(var) => std::env::var(var).ok().filter(|v| !v.is_empty()),
            None => Some(value.to_string()).filter(|v| !v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_key() {
        let config = CounsellorConfig {
            api_key: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_env_key() {
        let config = CounsellorConfig {
            api_key: Some("env:UNIPATH_TEST_KEY_THAT_DOES_NOT_EXIST".into()),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_provider_names() {
        let p: Provider = serde_json::from_str(r#""gemini""#).unwrap();
        assert_eq!(p, Provider::Gemini);
    }
}
