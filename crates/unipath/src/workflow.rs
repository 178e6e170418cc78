//! Typed rejections raised by the domain services.
//!
//! Services return `anyhow::Result` and bail with one of these when a request
//! breaks a business rule. The API layer downcasts them to pick the status
//! code instead of guessing from the message text.

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Business-rule rejections.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Referenced record does not exist (or belongs to someone else).
    #[error("{0}")]
    NotFound(String),

    /// Request is well-formed but not allowed in the current state.
    #[error("{0}")]
    Invalid(String),

    /// Request would duplicate an existing record.
    #[error("{0}")]
    Conflict(String),

    /// The user has not reached the stage this action needs.
    #[error("{0}")]
    Forbidden(String),

    /// Credentials or session are not acceptable.
    #[error("{0}")]
    Unauthorized(String),

    /// One or more fields failed validation.
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),
}

impl WorkflowError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field errors and turns them into a single rejection.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Check that a string's character count is within `min..=max`.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        self.check(
            (min..=max).contains(&len),
            field,
            format!("must be between {min} and {max} characters"),
        )
    }

    pub fn finish(&mut self) -> Result<(), WorkflowError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_all_failures() {
        let err = Validator::new()
            .length("name", "", 1, 100)
            .check(false, "email", "is not a valid email address")
            .check(true, "password", "never reported")
            .finish()
            .unwrap_err();

        match err {
            WorkflowError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "name");
                assert_eq!(fields[1].field, "email");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validator_passes() {
        assert!(Validator::new().length("title", "Draft SOP", 1, 500).finish().is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(Validator::new().length("name", "Zoë", 1, 3).finish().is_ok());
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = WorkflowError::Validation(vec![FieldError::new("title", "is required")]);
        assert_eq!(err.to_string(), "validation failed: title: is required");
    }
}
