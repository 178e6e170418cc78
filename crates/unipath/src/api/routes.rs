//! API route definitions.

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::auth_middleware;

use super::handlers;
use super::state::AppState;

/// Create the application router. Every route is nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        // Account
        .route("/auth/me", get(handlers::me))
        .route("/auth/change-password", post(handlers::change_password))
        .route("/auth/logout", post(handlers::logout))
        // Onboarding
        .route(
            "/onboarding",
            post(handlers::complete_onboarding).patch(handlers::update_profile),
        )
        .route("/onboarding/status", get(handlers::onboarding_status))
        // Progress
        .route("/dashboard", get(handlers::dashboard))
        .route("/stage", get(handlers::stage))
        // Universities
        .route("/universities", get(handlers::list_universities))
        .route(
            "/universities/recommendations",
            get(handlers::recommendations),
        )
        .route("/universities/shortlist", post(handlers::shortlist))
        .route(
            "/universities/shortlist/{university_id}",
            delete(handlers::remove_from_shortlist),
        )
        .route("/universities/shortlisted", get(handlers::list_shortlisted))
        .route("/universities/locked", get(handlers::list_locked))
        .route("/universities/lock", post(handlers::lock))
        .route("/universities/unlock", post(handlers::unlock))
        .route("/universities/{university_id}", get(handlers::get_university))
        // Tasks
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/generate", post(handlers::generate_tasks))
        .route(
            "/tasks/{task_id}",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Counsellor
        .route("/ai/counsellor", post(handlers::counsellor))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/options", get(handlers::options))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .with_state(state);

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(cors)
        .layer(trace_layer)
}

/// Build the CORS layer from the configured origins.
///
/// In dev mode the common localhost origins are always allowed.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins = state.auth.allowed_origins();
    let dev_mode = state.auth.is_dev_mode();

    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
        header::COOKIE,
    ];

    let mut origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if dev_mode {
        for origin in [
            "http://localhost:3000",
            "http://localhost:5173",
            "http://127.0.0.1:3000",
            "http://127.0.0.1:5173",
        ] {
            if let Ok(value) = origin.parse::<HeaderValue>()
                && !origins.contains(&value)
            {
                origins.push(value);
            }
        }
    }

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, denying all cross-origin requests");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}
