use std::sync::Arc;

use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::models::ApiError;

pub fn add<S: Clone + Send + Sync + 'static>(
    router: Router<S>,
    allowed_origins: Arc<[HeaderValue]>,
) -> Router<S> {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins.iter().cloned().collect::<Vec<_>>())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    router
        .layer(cors)
        .layer(from_fn(move |request: Request, next: Next| {
            let allowed_origins = Arc::clone(&allowed_origins);
            async move { reject_unknown_origin(&allowed_origins, request, next).await }
        }))
}

/// Requests without an `Origin` header (e.g. curl) are always allowed.
async fn reject_unknown_origin(
    allowed_origins: &[HeaderValue],
    request: Request,
    next: Next,
) -> Response {
    match request.headers().get(ORIGIN) {
        Some(origin) if !allowed_origins.contains(origin) => {
            debug!(?origin, "rejecting request from unknown origin");
            (
                StatusCode::FORBIDDEN,
                Json(ApiError {
                    error: "CORS Error",
                    message: "Origin not allowed by CORS policy".into(),
                    timestamp: None,
                }),
            )
                .into_response()
        }
        _ => next.run(request).await,
    }
}
