//! Test utilities and common setup.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use unipath::api::{self, AppState};
use unipath::auth::AuthConfig;
use unipath::counsellor::RuleBasedModel;
use unipath::db::Database;

/// Create a test AuthConfig with a JWT secret for testing.
fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some("test-secret-for-integration-tests-minimum-32-chars".to_string()),
        ..Default::default()
    }
}

/// Application router plus the database behind it.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

/// Create a test application on an in-memory database.
pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let state = AppState::new(db.clone(), test_auth_config(), Arc::new(RuleBasedModel));
    TestApp {
        router: api::create_router(state),
        db,
    }
}

impl TestApp {
    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Register a user and return their token.
    pub async fn signup(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({"name": name, "email": email, "password": "secret123"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register and complete onboarding with a 30k-50k budget.
    pub async fn onboarded_user(&self, email: &str) -> String {
        let token = self.signup("Test Student", email).await;
        let (status, body) = self
            .post(
                "/api/onboarding",
                &token,
                json!({
                    "education_level": "Bachelor's",
                    "major": "Computer Science",
                    "graduation_year": 2024,
                    "academic_score": "3.4/4",
                    "target_degree": "Master's",
                    "field": "Computer Science",
                    "intake_year": 2026,
                    "countries": ["UK", "Canada"],
                    "budget_range": "30000-50000",
                    "funding_type": "Self-funded",
                    "ielts_status": "Not started",
                    "gre_status": "Not started",
                    "sop_status": "Not started"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "onboarding failed: {body}");
        token
    }
}
