use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] reminder_core::Error),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),

    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),

    #[error("{0}")]
    BadRequest(String),

    #[error("channel directory unavailable: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Core(reminder_core::Error::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Core(reminder_core::Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Body(_) | Self::Path(_) | Self::Query(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// JSON body extractor that reports malformed bodies as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor that reports unparsable ids as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query extractor that reports malformed query strings as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
