//! Authentication middleware.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use std::sync::Arc;

use super::claims::ISSUER;
use super::{AuthConfig, AuthError, Claims};
use crate::user::{User, UserService};

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

fn token_from_cookie_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim()).filter(|v| !v.is_empty())
        } else {
            None
        }
    })
}

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    keys: Option<(EncodingKey, DecodingKey)>,
    users: UserService,
}

impl AuthState {
    /// Create new auth state from config.
    ///
    /// Resolves `env:VAR_NAME` syntax in jwt_secret. In dev mode a missing
    /// secret is replaced with a random one, so sessions end on restart.
    pub fn new(mut config: AuthConfig, users: UserService) -> Self {
        match config.resolve_jwt_secret() {
            Ok(Some(resolved)) => config.jwt_secret = Some(resolved),
            Ok(None) if config.dev_mode => {
                warn!("No JWT secret configured, generating an ephemeral one (dev mode)");
                config.jwt_secret = Some(AuthConfig::generate_jwt_secret());
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to resolve JWT secret: {}", e);
                config.jwt_secret = None;
            }
        }

        let keys = config.jwt_secret.as_ref().map(|s| {
            (
                EncodingKey::from_secret(s.as_bytes()),
                DecodingKey::from_secret(s.as_bytes()),
            )
        });

        Self {
            config: Arc::new(config),
            keys,
            users,
        }
    }

    /// Check if dev mode is enabled.
    pub fn is_dev_mode(&self) -> bool {
        self.config.dev_mode
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    fn ttl_seconds(&self) -> i64 {
        i64::try_from(self.config.token_ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX)
    }

    /// Validate a JWT token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let (_, decoding_key) = self
            .keys
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_string());

        let token_data = decode::<Claims>(token, decoding_key, &validation).map_err(|e| {
            warn!("JWT validation failed: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Issue a session token for a user.
    pub fn generate_token(&self, user: &User) -> Result<String, AuthError> {
        self.generate_token_with_ttl(user, self.ttl_seconds())
    }

    fn generate_token_with_ttl(&self, user: &User, ttl_seconds: i64) -> Result<String, AuthError> {
        let (encoding_key, _) = self
            .keys
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            iss: Some(ISSUER.to_string()),
            exp: now.saturating_add(ttl_seconds),
            iat: Some(now),
            email: Some(user.email.clone()),
            name: Some(user.name.clone()),
        };

        encode(&Header::default(), &claims, encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// `Set-Cookie` value carrying a session token.
    pub fn session_cookie(&self, token: &str) -> String {
        // Omit Secure in dev mode so http://localhost works.
        let secure_flag = if self.is_dev_mode() { "" } else { " Secure;" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax;{} Max-Age={}",
            AUTH_COOKIE,
            token,
            secure_flag,
            self.ttl_seconds()
        )
    }

    /// `Set-Cookie` value that clears the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", AUTH_COOKIE)
    }

    /// Validate a token and load the user it belongs to.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.validate_token(token)?;
        let user = self
            .users
            .get_user(&claims.sub)
            .await
            .map_err(|e| AuthError::Internal(format!("{e:#}")))?
            .ok_or(AuthError::UserNotFound)?;

        Ok(CurrentUser { claims, user })
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Token claims.
    pub claims: Claims,
    /// User row as loaded when the request was authenticated.
    pub user: User,
}

impl CurrentUser {
    /// Get the user ID.
    pub fn id(&self) -> &str {
        &self.claims.sub
    }

    /// Get display name.
    pub fn display_name(&self) -> &str {
        &self.user.name
    }
}

/// Extract authentication from request.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Authentication middleware.
///
/// Validates JWT tokens and injects `CurrentUser` into request extensions.
/// Supports two auth methods in priority order:
/// 1. Authorization: Bearer <token> header
/// 2. auth_token cookie
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let cookie_token = req
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookie_header| token_from_cookie_header(cookie_header, AUTH_COOKIE));

    let token = if let Some(header) = auth_header {
        bearer_token_from_header(header)?
    } else if let Some(token) = cookie_token {
        token
    } else {
        return Err(AuthError::MissingAuthHeader);
    };

    let user = auth.authenticate(token).await?;
    debug!("Authenticated user {}", user.id());

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::user::{SignupRequest, UserRepository};

    const SECRET: &str = "test-secret-for-unit-tests-minimum-32-chars-long";

    async fn state() -> (AuthState, User) {
        let db = Database::in_memory().await.unwrap();
        let users = UserService::new(UserRepository::new(db.pool().clone()));
        let user = users
            .signup(SignupRequest {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();
        let config = AuthConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..Default::default()
        };
        (AuthState::new(config, users), user)
    }

    #[test]
    fn test_bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
        assert_eq!(
            bearer_token_from_header("   Bearer\tmixed-case ").unwrap(),
            "mixed-case"
        );
    }

    #[test]
    fn test_bearer_token_from_header_invalid() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "Token something",
            "Bearer token extra",
            "bear token",
        ];

        for case in cases {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(
            token_from_cookie_header("theme=dark; auth_token=abc; x=1", "auth_token"),
            Some("abc")
        );
        assert_eq!(token_from_cookie_header("auth_token=", "auth_token"), None);
        assert_eq!(token_from_cookie_header("other=abc", "auth_token"), None);
    }

    #[tokio::test]
    async fn test_generate_and_authenticate() {
        let (state, user) = state().await;
        let token = state.generate_token(&user).unwrap();

        let claims = state.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.iss.as_deref(), Some(ISSUER));
        // Default lifetime is seven days.
        assert_eq!(claims.exp - claims.iat.unwrap(), 7 * 24 * 3600);

        let current = state.authenticate(&token).await.unwrap();
        assert_eq!(current.id(), user.id);
        assert_eq!(current.display_name(), "Asha");
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (state, user) = state().await;
        let token = state.generate_token_with_ttl(&user, -60).unwrap();
        assert!(matches!(
            state.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_rejected() {
        let (state, mut user) = state().await;
        user.id = "ghost".to_string();
        let token = state.generate_token(&user).unwrap();
        assert!(matches!(
            state.authenticate(&token).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_rejected() {
        let (state, user) = state().await;
        let other = AuthState::new(
            AuthConfig {
                dev_mode: true,
                ..Default::default()
            },
            state.users.clone(),
        );
        let token = other.generate_token(&user).unwrap();
        assert!(matches!(
            state.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_cookies() {
        let (state, _) = state().await;
        let cookie = state.session_cookie("tok");
        assert!(cookie.starts_with("auth_token=tok;"));
        assert!(cookie.contains("Secure"));
        assert!(state.clear_cookie().contains("Max-Age=0"));
    }
}
