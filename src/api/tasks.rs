use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reminder_core::models::{CreateTaskInput, Task, TaskView, UpdateTaskInput};

use super::{ApiError, ApiJson, ApiPath, AppState};

fn view(state: &AppState, task: Task) -> Result<TaskView, ApiError> {
    let holding = state.db.get_holding(task.holding_id)?;
    Ok(TaskView::new(task, holding.date))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    ApiPath(holding_id): ApiPath<i64>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let holding = state.db.get_holding(holding_id)?;
    let tasks = state.db.list_tasks(holding_id)?;
    Ok(Json(
        tasks
            .into_iter()
            .map(|t| TaskView::new(t, holding.date))
            .collect(),
    ))
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiPath(holding_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CreateTaskInput>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    let task = state.db.create_task(holding_id, input)?;
    Ok((StatusCode::CREATED, Json(view(&state, task)?)))
}

pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
) -> Result<Json<TaskView>, ApiError> {
    let task = state.db.get_task(task_id)?;
    Ok(Json(view(&state, task)?))
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateTaskInput>,
) -> Result<Json<TaskView>, ApiError> {
    let task = state.db.update_task(task_id, input)?;
    Ok(Json(view(&state, task)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_task(task_id)?;
    Ok(StatusCode::NO_CONTENT)
}
