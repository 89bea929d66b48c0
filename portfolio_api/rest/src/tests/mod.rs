use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    response::Response,
    Extension, Router,
};
use http_body_util::BodyExt;
use portfolio_core_contact_contracts::MockContactFeatureService;
use portfolio_core_health_contracts::MockHealthFeatureService;
use portfolio_demo::CLIENT_IP_1;
use portfolio_shared_contracts::rate_limit::{
    MockRateLimitService, RateLimitDecision, RateLimitPolicy,
};
use tower::ServiceExt;

use crate::{RealIpConfig, RestServer, RestServerConfig};

mod health;

const GLOBAL: RateLimitPolicy = RateLimitPolicy {
    bucket: "global",
    max_requests: 100,
    window: Duration::from_secs(15 * 60),
};

const FRONTEND: &str = "https://portfolio.example.com";

struct Sut {
    health: MockHealthFeatureService,
    contact: MockContactFeatureService,
    rate_limit: MockRateLimitService,
    real_ip: Option<RealIpConfig>,
    development: bool,
}

impl Default for Sut {
    fn default() -> Self {
        Self {
            health: MockHealthFeatureService::new(),
            contact: MockContactFeatureService::new(),
            rate_limit: allow_all(),
            real_ip: None,
            development: false,
        }
    }
}

impl Sut {
    fn router(self) -> Router<()> {
        RestServer {
            health: self.health,
            contact: self.contact,
            rate_limit: self.rate_limit,
            config: RestServerConfig {
                real_ip: self.real_ip.map(Arc::new),
                development: self.development,
                ..config()
            },
        }
        .router()
        .layer(peer())
    }

    async fn send(self, request: Request<Body>) -> TestResponse {
        TestResponse::read(self.router().oneshot(request).await.unwrap()).await
    }
}

/// Connection info as inserted by `into_make_service_with_connect_info`.
fn peer() -> Extension<ConnectInfo<SocketAddr>> {
    Extension(ConnectInfo(SocketAddr::new(CLIENT_IP_1, 4242)))
}

fn config() -> RestServerConfig {
    RestServerConfig {
        addr: ([127, 0, 0, 1], 0).into(),
        real_ip: None,
        allowed_origins: [FRONTEND, "http://localhost:3000", "http://127.0.0.1:3000"]
            .map(HeaderValue::from_static)
            .into(),
        global_rate_limit: GLOBAL,
        development: false,
    }
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: serde_json::Value,
}

impl TestResponse {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        Self {
            status,
            headers,
            body,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|x| x.to_str().unwrap())
    }
}

fn allow_all() -> MockRateLimitService {
    let mut rate_limit = MockRateLimitService::new();
    rate_limit
        .expect_acquire()
        .withf(|policy, _| *policy == GLOBAL)
        .returning(|policy, _| RateLimitDecision {
            allowed: true,
            limit: policy.max_requests,
            remaining: policy.max_requests - 1,
            reset_after: policy.window,
        });
    rate_limit
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
