use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use portfolio_shared_contracts::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimitService};
use portfolio_utils::humanize_duration;
use tracing::debug;

use super::client_ip::ClientIp;
use crate::models::ApiRateLimited;

pub fn add<S: Clone + Send + Sync + 'static>(
    router: Router<S>,
    service: Arc<impl RateLimitService>,
    policy: RateLimitPolicy,
) -> Router<S> {
    router.layer(from_fn(move |request: Request, next: Next| {
        let service = Arc::clone(&service);
        async move { middleware(&*service, policy, request, next).await }
    }))
}

async fn middleware(
    service: &impl RateLimitService,
    policy: RateLimitPolicy,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ClientIp>()
        .map(|ClientIp(ip)| ip.to_string())
        .unwrap_or_default();
    let decision = service.acquire(&policy, &key);

    if !decision.allowed {
        debug!(client_ip = %key, "global rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            headers(&decision),
            retry_after_header(&decision),
            Json(ApiRateLimited {
                error: "Too many requests from this IP, please try again later.",
                retry_after: humanize_duration(policy.window),
            }),
        )
            .into_response();
    }

    // a stricter limit of the route takes precedence
    let mut response = next.run(request).await;
    for (name, value) in headers(&decision) {
        response.headers_mut().entry(name).or_insert(value);
    }
    response
}

/// `RateLimit-*` headers describing the current window.
pub fn headers(decision: &RateLimitDecision) -> [(&'static str, HeaderValue); 3] {
    [
        ("ratelimit-limit", decision.limit.into()),
        ("ratelimit-remaining", decision.remaining.into()),
        ("ratelimit-reset", reset_secs(decision).into()),
    ]
}

pub fn retry_after_header(decision: &RateLimitDecision) -> [(&'static str, HeaderValue); 1] {
    [("retry-after", reset_secs(decision).into())]
}

/// Seconds until the window ends, rounded up.
fn reset_secs(decision: &RateLimitDecision) -> u64 {
    let reset_after = decision.reset_after;
    reset_after.as_secs() + u64::from(reset_after.subsec_nanos() > 0)
}
