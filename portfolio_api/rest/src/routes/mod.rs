use axum::{
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::models::{timestamp, ApiError};

pub mod contact;
pub mod health;

pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    let path = uri.path_and_query().map_or("/", |x| x.as_str());
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: "Route not found",
            message: format!("Cannot {method} {path}"),
            timestamp: Some(timestamp(Utc::now())),
        }),
    )
        .into_response()
}
