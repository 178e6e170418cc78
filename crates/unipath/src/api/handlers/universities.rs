//! University catalog, recommendation and shortlist handlers.

use axum::{Json, extract::State};
use tracing::{debug, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::catalog::{Recommendations, University, UniversityQuery, recommend::recommend};
use crate::shortlist::{
    LockRequest, LockResponse, RemoveResponse, ShortlistRequest, ShortlistResponse,
    ShortlistedList,
};

/// Browse the catalog with optional filters.
#[instrument(skip(state, _user))]
pub async fn list_universities(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<UniversityQuery>,
) -> ApiResult<Json<Vec<University>>> {
    let universities = state.universities.list(&query).await?;
    debug!(count = universities.len(), "Listed universities");
    Ok(Json(universities))
}

pub async fn get_university(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(university_id): ApiPath<i64>,
) -> ApiResult<Json<University>> {
    state
        .universities
        .get(university_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("University not found"))
}

/// Dream/Target/Safe buckets for the caller's profile.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn recommendations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Recommendations>> {
    let profile = state.profiles.require(user.id()).await?;
    let universities = state.universities.all().await?;
    Ok(Json(recommend(&profile, universities)))
}

pub async fn shortlist(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<ShortlistRequest>,
) -> ApiResult<Json<ShortlistResponse>> {
    Ok(Json(state.shortlists.shortlist(user.id(), request).await?))
}

pub async fn remove_from_shortlist(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(university_id): ApiPath<i64>,
) -> ApiResult<Json<RemoveResponse>> {
    Ok(Json(state.shortlists.remove(user.id(), university_id).await?))
}

pub async fn list_shortlisted(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ShortlistedList>> {
    Ok(Json(state.shortlists.shortlisted(user.id()).await?))
}

pub async fn list_locked(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ShortlistedList>> {
    Ok(Json(state.shortlists.locked(user.id()).await?))
}

pub async fn lock(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<LockRequest>,
) -> ApiResult<Json<LockResponse>> {
    Ok(Json(
        state.shortlists.lock(user.id(), request.university_id).await?,
    ))
}

pub async fn unlock(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<LockRequest>,
) -> ApiResult<Json<LockResponse>> {
    Ok(Json(
        state
            .shortlists
            .unlock(user.id(), request.university_id)
            .await?,
    ))
}
