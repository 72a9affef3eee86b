use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reminder_core::models::{CreateEventInput, Event, UpdateEventInput};

use super::{ApiError, ApiJson, ApiPath, AppState};

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.db.list_events()?))
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateEventInput>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.db.create_event(input)?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i64>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.db.get_event(event_id)?))
}

pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateEventInput>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.db.update_event(event_id, input)?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_event(event_id)?;
    Ok(StatusCode::NO_CONTENT)
}
