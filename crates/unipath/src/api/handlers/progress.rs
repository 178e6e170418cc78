//! Dashboard and stage handlers.

use axum::{Json, extract::State};

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::dashboard::Dashboard;
use crate::stage::StageInfo;

pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.dashboard.load(user.id()).await?))
}

/// Stage details; a stale cached stage is corrected on the way.
pub async fn stage(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<StageInfo>> {
    Ok(Json(state.stages.refreshed_info(user.id()).await?))
}
