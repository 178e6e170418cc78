//! User service for business logic.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use super::models::{SignupRequest, User};
use super::repository::UserRepository;
use crate::workflow::{Validator, WorkflowError};

/// bcrypt only looks at the first 72 bytes of a password.
const BCRYPT_MAX_BYTES: usize = 72;

/// Service for account operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Register a new account.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);

        let mut v = Validator::new();
        v.length("name", name, 1, 100)
            .check(
                is_valid_email(&email),
                "email",
                "is not a valid email address",
            );
        check_password(&mut v, "password", &request.password);
        v.finish()?;

        if !self.repo.is_email_available(&email).await? {
            return Err(WorkflowError::conflict("Email already registered").into());
        }

        let hash = hash_password(&request.password)?;
        let user = self.repo.create(name, &email, &hash).await?;
        info!(user_id = %user.id, "Created new user");

        Ok(user)
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.repo.get(id).await
    }

    /// Verify email + password. Returns `None` on any mismatch.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.repo.get_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Change a password after checking the current one.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self
            .repo
            .get(user_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User not found"))?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(WorkflowError::invalid("Incorrect old password").into());
        }

        let mut v = Validator::new();
        check_password(&mut v, "new_password", new_password);
        v.finish()?;

        let hash = hash_password(new_password)?;
        self.repo.update_password(user_id, &hash).await?;
        info!(user_id, "Password changed");

        Ok(())
    }
}

fn check_password(v: &mut Validator, field: &str, password: &str) {
    v.length(field, password, 6, 100).check(
        password.len() <= BCRYPT_MAX_BYTES,
        field,
        "must be at most 72 bytes",
    );
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Hash a password using bcrypt.
pub fn hash_password(password: &str) -> Result<String> {
    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn service() -> UserService {
        let db = Database::in_memory().await.unwrap();
        UserService::new(UserRepository::new(db.pool().clone()))
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Asha".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@sub.domain.com"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("test_password").unwrap();
        assert!(verify_password("test_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_signup_and_login() {
        let service = service().await;
        let user = service.signup(signup(" Asha@Example.com ")).await.unwrap();
        assert_eq!(user.email, "asha@example.com");
        assert!(!user.onboarding_completed);

        let found = service
            .verify_credentials("ASHA@example.com", "secret123")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(
            service
                .verify_credentials("asha@example.com", "nope")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service().await;
        service.signup(signup("a@example.com")).await.unwrap();
        let err = service.signup(signup("a@example.com")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let service = service().await;
        let err = service
            .signup(SignupRequest {
                name: "".into(),
                email: "bad".into(),
                password: "x".repeat(80),
            })
            .await
            .unwrap_err();
        match err.downcast_ref::<WorkflowError>() {
            Some(WorkflowError::Validation(fields)) => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["name", "email", "password"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = service().await;
        let user = service.signup(signup("b@example.com")).await.unwrap();

        let err = service
            .change_password(&user.id, "wrong", "newsecret")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Invalid(_))
        ));

        service
            .change_password(&user.id, "secret123", "newsecret")
            .await
            .unwrap();
        assert!(
            service
                .verify_credentials("b@example.com", "newsecret")
                .await
                .unwrap()
                .is_some()
        );
    }
}
