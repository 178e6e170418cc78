//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Default session lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 24 * 7;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Development mode: a random secret is generated when none is set and
    /// the session cookie is sent without `Secure`.
    pub dev_mode: bool,

    /// JWT secret for HS256. Literal value or `env:VAR_NAME`.
    /// REQUIRED when dev_mode is false.
    pub jwt_secret: Option<String>,

    /// Session token lifetime in hours.
    pub token_ttl_hours: u64,

    /// Allowed CORS origins. If empty in production, CORS is disabled.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            // No default JWT secret - must be explicitly configured
            jwt_secret: None,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration.
    /// Returns an error if the configuration is invalid for the current mode.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.token_ttl_hours == 0 {
            return Err(ConfigValidationError::ZeroTokenTtl);
        }

        if !self.dev_mode {
            let secret = self
                .resolve_jwt_secret()?
                .ok_or(ConfigValidationError::MissingJwtSecret)?;

            if secret.len() < 32 {
                return Err(ConfigValidationError::JwtSecretTooShort);
            }
        }

        Ok(())
    }

    /// Generate a random 64-character JWT secret.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    /// JWT secret is required in production mode.
    #[error(
        "JWT secret is required when dev_mode is false. Set UNIPATH__AUTH__JWT_SECRET or auth.jwt_secret in config."
    )]
    MissingJwtSecret,
    /// JWT secret is too short (minimum 32 characters).
    #[error("JWT secret must be at least 32 characters long.")]
    JwtSecretTooShort,
    /// Token lifetime of zero would expire every session immediately.
    #[error("auth.token_ttl_hours must be greater than zero.")]
    ZeroTokenTtl,
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    #[error("Environment variable '{0}' not found (referenced in jwt_secret).")]
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    #[error("Environment variable '{0}' is empty (referenced in jwt_secret).")]
    EnvVarEmpty(String),
}
