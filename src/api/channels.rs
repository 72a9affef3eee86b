use axum::extract::State;
use axum::Json;

use super::{ApiError, AppState};
use crate::channels::ChannelEntry;

pub async fn list_channels(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChannelEntry>>, ApiError> {
    Ok(Json(state.channels.get().await?))
}
