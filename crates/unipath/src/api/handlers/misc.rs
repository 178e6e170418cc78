//! Miscellaneous handlers (health, option lists).

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use crate::api::state::AppState;
use crate::options::OptionsResponse;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
}

/// Plain confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check database ping failed: {:#}", e);
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}

/// Dropdown values for the onboarding form and task filters.
pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse::all())
}
