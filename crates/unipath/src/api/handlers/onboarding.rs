//! Onboarding handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::profile::{OnboardingResponse, OnboardingStatus, ProfileRequest};

#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> ApiResult<Json<OnboardingResponse>> {
    Ok(Json(
        state.profiles.complete_onboarding(user.id(), request).await?,
    ))
}

#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> ApiResult<Json<OnboardingResponse>> {
    Ok(Json(state.profiles.update_profile(user.id(), request).await?))
}

pub async fn onboarding_status(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<OnboardingStatus>> {
    Ok(Json(state.profiles.status(user.id()).await?))
}
