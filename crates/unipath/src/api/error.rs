//! Unified API error handling with structured responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::counsellor::CounsellorError;
use crate::workflow::{FieldError, WorkflowError};

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    BadGateway(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::BadGateway(_) => "BAD_GATEWAY",
        }
    }

    /// Categorize an anyhow error into the appropriate ApiError variant.
    ///
    /// Typed rejections ([`WorkflowError`], [`CounsellorError`], [`AuthError`])
    /// are honoured first. Anything else falls back to message patterns:
    /// - "not found" -> NotFound
    /// - "already registered" / "already exists" -> Conflict
    /// - "invalid" / "must be" / "cannot" -> BadRequest
    /// - Default -> Internal
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<WorkflowError>() {
            Ok(rejection) => return rejection.into(),
            Err(err) => err,
        };
        let err = match err.downcast::<CounsellorError>() {
            Ok(upstream) => return upstream.into(),
            Err(err) => err,
        };
        let err = match err.downcast::<AuthError>() {
            Ok(auth) => return auth.into(),
            Err(err) => err,
        };

        let msg = format!("{err:#}");
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found") {
            ApiError::NotFound(msg)
        } else if msg_lower.contains("already registered") || msg_lower.contains("already exists") {
            ApiError::Conflict(msg)
        } else if msg_lower.contains("invalid")
            || msg_lower.contains("must be")
            || msg_lower.contains("cannot")
        {
            ApiError::BadRequest(msg)
        } else {
            ApiError::Internal(msg)
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::Internal(msg) | ApiError::BadGateway(msg) => {
                error!(error_code = code, message = %msg, "API error");
            }
            ApiError::ServiceUnavailable(msg) => {
                warn!(error_code = code, message = %msg, "Service unavailable");
            }
            _ => {
                tracing::debug!(error_code = code, message = %message, "Client error");
            }
        }

        // Internal details stay in the logs.
        let error = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            _ => message,
        };
        let fields = match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        };

        (status, Json(ErrorResponse { error, code, fields })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_anyhow(err)
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound(msg) => ApiError::NotFound(msg),
            WorkflowError::Invalid(msg) => ApiError::BadRequest(msg),
            WorkflowError::Conflict(msg) => ApiError::Conflict(msg),
            WorkflowError::Forbidden(msg) => ApiError::Forbidden(msg),
            WorkflowError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            WorkflowError::Validation(fields) => ApiError::Validation(fields),
        }
    }
}

impl From<CounsellorError> for ApiError {
    fn from(err: CounsellorError) -> Self {
        match err {
            CounsellorError::NotConfigured(msg) => ApiError::ServiceUnavailable(msg),
            other => ApiError::BadGateway(format!("Counsellor model failed: {other}")),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                ApiError::Unauthorized("Missing or invalid authorization".to_string())
            }
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(format!("Invalid token: {msg}")),
            AuthError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Incorrect email or password".to_string())
            }
            AuthError::UserNotFound => ApiError::Unauthorized("User not found".to_string()),
            AuthError::Internal(msg) => ApiError::Internal(format!("Authentication error: {msg}")),
        }
    }
}

/// Undecodable bodies are field validation failures; broken syntax, a
/// missing content type or an unreadable body are bad requests.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::Validation(vec![FieldError::new("body", err.body_text())])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_errors_map_to_status() {
        let cases = [
            (WorkflowError::not_found("x"), StatusCode::NOT_FOUND),
            (WorkflowError::invalid("x"), StatusCode::BAD_REQUEST),
            (WorkflowError::conflict("x"), StatusCode::CONFLICT),
            (WorkflowError::forbidden("x"), StatusCode::FORBIDDEN),
            (WorkflowError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (
                WorkflowError::Validation(vec![FieldError::new("title", "is required")]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, status) in cases {
            let api_err = ApiError::from_anyhow(err.into());
            assert_eq!(api_err.status_code(), status);
        }
    }

    #[test]
    fn test_downcast_survives_context() {
        use anyhow::Context;
        let err: anyhow::Result<()> = Err(WorkflowError::conflict("University already shortlisted").into());
        let err = err.context("shortlisting").unwrap_err();
        // Context wraps the error; downcast still finds the workflow rejection.
        assert!(matches!(ApiError::from_anyhow(err), ApiError::Conflict(_)));
    }

    #[test]
    fn test_counsellor_errors_are_upstream_failures() {
        let err = CounsellorError::InvalidResponse("not json".into());
        assert_eq!(
            ApiError::from_anyhow(err.into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        let err = CounsellorError::NotConfigured("no key".into());
        assert_eq!(
            ApiError::from(err).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_categorization_fallbacks() {
        let api_err = ApiError::from_anyhow(anyhow::anyhow!("Session not found: abc123"));
        assert!(matches!(api_err, ApiError::NotFound(_)));

        let api_err = ApiError::from_anyhow(anyhow::anyhow!("row already exists"));
        assert!(matches!(api_err, ApiError::Conflict(_)));

        let api_err = ApiError::from_anyhow(anyhow::anyhow!("Invalid budget range"));
        assert!(matches!(api_err, ApiError::BadRequest(_)));

        let api_err = ApiError::from_anyhow(anyhow::anyhow!("disk on fire"));
        assert!(matches!(api_err, ApiError::Internal(_)));
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        let api_err: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(api_err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(api_err.to_string(), "Incorrect email or password");
    }
}
