//! Counsellor model errors.

use thiserror::Error;

/// Result type for counsellor model operations.
pub type CounsellorResult<T> = Result<T, CounsellorError>;

/// Errors raised while asking a model for a plan.
#[derive(Debug, Error)]
pub enum CounsellorError {
    /// The configured provider is missing required settings.
    #[error("Counsellor model is not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed.
    #[error("Model request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Model error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// The provider's answer was not a valid plan.
    #[error("Model returned invalid JSON: {0}")]
    InvalidResponse(String),
}
