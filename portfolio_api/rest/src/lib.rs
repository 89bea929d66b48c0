use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use portfolio_core_contact_contracts::ContactFeatureService;
use portfolio_core_health_contracts::HealthFeatureService;
use portfolio_di::Build;
use portfolio_shared_contracts::rate_limit::{RateLimitPolicy, RateLimitService};
use tokio::net::TcpListener;
use tracing::info;

mod errors;
mod middlewares;
mod models;
mod routes;
#[cfg(test)]
mod tests;

/// Requests with larger bodies are rejected before reaching a handler.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Build)]
pub struct RestServer<Health, Contact, RateLimit> {
    health: Health,
    contact: Contact,
    rate_limit: RateLimit,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub addr: SocketAddr,
    pub real_ip: Option<Arc<RealIpConfig>>,
    /// Origins that may access the api from a browser.
    pub allowed_origins: Arc<[HeaderValue]>,
    /// Applied to every request of a client.
    pub global_rate_limit: RateLimitPolicy,
    /// Include error details in responses and enable the test endpoint.
    pub development: bool,
}

/// Read the client ip from `header` if the request comes from `set_from`,
/// e.g. a reverse proxy.
#[derive(Debug, Clone)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact, RateLimit> RestServer<Health, Contact, RateLimit>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
    RateLimit: RateLimitService,
{
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let addr = self.config.addr;
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {addr}"))?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let config = self.config;

        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::contact::router(
                self.contact.into(),
                config.development,
            ))
            .fallback(routes::not_found)
            .layer(DefaultBodyLimit::max(BODY_LIMIT));

        // innermost first
        let router =
            middlewares::rate_limit::add(router, self.rate_limit.into(), config.global_rate_limit);
        let router = middlewares::cors::add(router, config.allowed_origins);
        let router = middlewares::panic_handler::add(router, config.development);
        let router = middlewares::security_headers::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::client_ip::add(router, config.real_ip);
        middlewares::request_id::add(router)
    }
}
