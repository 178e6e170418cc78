//! AI counsellor handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::counsellor::{CounsellorRequest, CounsellorResponse};

/// One counsellor turn. Proposed actions are validated and executed
/// server-side; the response reports what happened to each.
#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn counsellor(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CounsellorRequest>,
) -> ApiResult<Json<CounsellorResponse>> {
    Ok(Json(state.counsellor.chat(user.id(), request).await?))
}
