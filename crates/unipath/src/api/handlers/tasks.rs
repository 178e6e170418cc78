//! Task handlers.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::tasks::{
    CreateTaskRequest, GenerateTasksResponse, TaskListQuery, TaskResponse, UpdateTaskRequest,
};

pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    Ok(Json(state.tasks.list(user.id(), query).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state.tasks.create(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(state.tasks.get(user.id(), task_id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(state.tasks.update(user.id(), task_id, request).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(user.id(), task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the default checklist for the user's current stage.
pub async fn generate_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<GenerateTasksResponse>> {
    Ok(Json(state.tasks.generate_defaults(user.id()).await?))
}
