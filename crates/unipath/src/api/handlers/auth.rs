//! Authentication handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::auth::{AuthError, CurrentUser};
use crate::user::{ChangePasswordRequest, LoginRequest, SignupRequest, User, UserInfo};

use super::misc::MessageResponse;

/// Issued on signup and login. The same token is also set as a cookie.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: String,
    pub name: String,
    pub email: String,
}

fn issue(state: &AppState, user: User) -> ApiResult<(String, TokenResponse)> {
    let token = state.auth.generate_token(&user)?;
    let cookie = state.auth.session_cookie(&token);
    Ok((
        cookie,
        TokenResponse {
            access_token: token,
            token_type: "bearer",
            user_id: user.id,
            name: user.name,
            email: user.email,
        },
    ))
}

/// Register and sign in.
#[instrument(skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.signup(request).await?;
    let (cookie, body) = issue(&state, user)?;

    info!(user_id = %body.user_id, "User signed up");
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(body),
    ))
}

/// Login endpoint.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .verify_credentials(&request.email, &request.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let (cookie, body) = issue(&state, user)?;

    info!(user_id = %body.user_id, "User logged in successfully");
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(body)))
}

/// Current user, with the stage recomputed from the stored facts.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<UserInfo>> {
    let stage = state.stages.refresh(user.id()).await?;
    let mut info = UserInfo::from(user.user);
    info.current_stage = stage;
    Ok(Json(info))
}

#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .users
        .change_password(user.id(), &request.old_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Logout endpoint (clears auth cookie).
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, state.auth.clear_cookie())]),
        StatusCode::NO_CONTENT,
    )
}
