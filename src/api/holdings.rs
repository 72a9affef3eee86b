use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reminder_core::db::HoldingFilter;
use reminder_core::models::{CreateHoldingInput, CreatedHolding, Holding, UpdateHoldingInput};
use serde::Deserialize;

use super::{ApiError, ApiJson, ApiPath, ApiQuery, AppState};

#[derive(Debug, Deserialize)]
pub struct HoldingQuery {
    source_event_id: Option<String>,
}

impl HoldingQuery {
    fn filter(&self) -> Result<HoldingFilter, ApiError> {
        match self.source_event_id.as_deref().map(str::trim) {
            None | Some("") => Ok(HoldingFilter::All),
            Some(raw) => raw
                .parse()
                .map(HoldingFilter::Event)
                .map_err(|_| ApiError::BadRequest(format!("invalid source_event_id: {raw}"))),
        }
    }
}

pub async fn list_holdings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HoldingQuery>,
) -> Result<Json<Vec<Holding>>, ApiError> {
    Ok(Json(state.db.list_holdings(query.filter()?)?))
}

/// Creates the holding and seeds its tasks with the configured template policy.
/// A blank channel id falls back to the configured reminder channel.
pub async fn create_holding(
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<CreateHoldingInput>,
) -> Result<(StatusCode, Json<CreatedHolding>), ApiError> {
    if input.channel_id.trim().is_empty() {
        if let Some(channel_id) = &state.default_channel_id {
            input.channel_id = channel_id.clone();
        }
    }
    let created = state.db.create_holding(input, state.template_policy)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_holding(
    State(state): State<AppState>,
    ApiPath(holding_id): ApiPath<i64>,
) -> Result<Json<Holding>, ApiError> {
    Ok(Json(state.db.get_holding(holding_id)?))
}

pub async fn update_holding(
    State(state): State<AppState>,
    ApiPath(holding_id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateHoldingInput>,
) -> Result<Json<Holding>, ApiError> {
    Ok(Json(state.db.update_holding(holding_id, input)?))
}

pub async fn delete_holding(
    State(state): State<AppState>,
    ApiPath(holding_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_holding(holding_id)?;
    Ok(StatusCode::NO_CONTENT)
}
