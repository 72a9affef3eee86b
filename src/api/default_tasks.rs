use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reminder_core::models::{CreateDefaultTaskInput, DefaultTask, UpdateDefaultTaskInput};

use super::{ApiError, ApiJson, ApiPath, AppState};

pub async fn list_default_tasks(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i64>,
) -> Result<Json<Vec<DefaultTask>>, ApiError> {
    Ok(Json(state.db.list_default_tasks(event_id)?))
}

pub async fn create_default_task(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CreateDefaultTaskInput>,
) -> Result<(StatusCode, Json<DefaultTask>), ApiError> {
    let task = state.db.create_default_task(event_id, input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_default_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
) -> Result<Json<DefaultTask>, ApiError> {
    Ok(Json(state.db.get_default_task(task_id)?))
}

pub async fn update_default_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateDefaultTaskInput>,
) -> Result<Json<DefaultTask>, ApiError> {
    Ok(Json(state.db.update_default_task(task_id, input)?))
}

pub async fn delete_default_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_default_task(task_id)?;
    Ok(StatusCode::NO_CONTENT)
}
