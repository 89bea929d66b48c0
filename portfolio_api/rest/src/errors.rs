use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::models::{timestamp, ApiError};

/// Log an unexpected error and respond with a generic 500.
pub fn internal_server_error(err: impl Into<anyhow::Error>, development: bool) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");

    let message = if development {
        format!("{err:#}")
    } else {
        "Something went wrong".into()
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: "Internal Server Error",
            message,
            timestamp: Some(timestamp(Utc::now())),
        }),
    )
        .into_response()
}
