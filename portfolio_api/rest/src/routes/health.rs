use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use chrono::Utc;
use portfolio_core_health_contracts::{HealthFeatureService, HealthStatus};
use portfolio_utils::portfolio_version;
use serde::Serialize;

use crate::models::timestamp;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .route("/api/contact/health", routing::get(contact_health))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    timestamp: String,
    version: &'static str,
}

/// Liveness only, does not touch any backing service.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Portfolio server is running",
        timestamp: timestamp(Utc::now()),
        version: portfolio_version(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactHealthResponse {
    status: &'static str,
    gmail_connection: &'static str,
    timestamp: String,
}

async fn contact_health(service: State<Arc<impl HealthFeatureService>>) -> Response {
    let HealthStatus { email } = service.get_status().await;

    Json(ContactHealthResponse {
        status: "ok",
        gmail_connection: if email { "connected" } else { "disconnected" },
        timestamp: timestamp(Utc::now()),
    })
    .into_response()
}
