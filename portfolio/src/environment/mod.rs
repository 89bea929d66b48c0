use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::HeaderValue;
use portfolio_api_rest::{RealIpConfig, RestServerConfig};
use portfolio_config::{Config, RateLimitConfig};
use portfolio_core_contact_impl::{dispatch::ContactDispatchConfig, ContactFeatureConfig};
use portfolio_core_health_impl::HealthFeatureConfig;
use portfolio_di::provider;
use portfolio_extern_impl::resume::ResumeApiServiceConfig;
use portfolio_shared_contracts::rate_limit::RateLimitPolicy;
use types::Email;

pub mod types;

/// Local frontend dev servers, allowed by CORS in every environment.
const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

provider! {
    /// The default provider, capable of providing all the dependencies
    pub Provider {
        email: Email,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Extern
            ResumeApiServiceConfig,

            // Core
            ContactDispatchConfig,
            ContactFeatureConfig,
            HealthFeatureConfig,
        }
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        Self {
            _cache: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Extern
        resume_api_service_config: ResumeApiServiceConfig,

        // Core
        contact_dispatch_config: ContactDispatchConfig,
        contact_feature_config: ContactFeatureConfig,
        health_feature_config: HealthFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let rest_server_config = RestServerConfig {
            addr: SocketAddr::new(config.http.host, config.http.port),
            real_ip: config.http.real_ip.as_ref().map(|real_ip| {
                Arc::new(RealIpConfig {
                    header: real_ip.header.clone(),
                    set_from: real_ip.set_from,
                })
            }),
            allowed_origins: allowed_origins(&config.http.frontend_url)?,
            global_rate_limit: rate_limit_policy("global", &config.http.rate_limit),
            development: config.environment.is_development(),
        };

        // Extern
        let resume_api_service_config = ResumeApiServiceConfig {
            endpoint: config.resume.endpoint.clone().into(),
            api_key: config.resume.api_key.as_deref().map(Into::into),
            file_id: config.resume.file_id.as_deref().map(Into::into),
        };

        // Core
        let contact_dispatch_config = ContactDispatchConfig {
            recipient: config.contact.recipient.clone().into(),
        };

        let contact_feature_config = ContactFeatureConfig {
            rate_limit: rate_limit_policy("contact", &config.contact.rate_limit),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Ok(Self {
            _cache: Default::default(),
            rest_server_config,
            resume_api_service_config,
            contact_dispatch_config,
            contact_feature_config,
            health_feature_config,
        })
    }
}

fn rate_limit_policy(bucket: &'static str, config: &RateLimitConfig) -> RateLimitPolicy {
    RateLimitPolicy {
        bucket,
        max_requests: config.max_requests,
        window: config.window.into(),
    }
}

fn allowed_origins(frontend_url: &str) -> anyhow::Result<Arc<[HeaderValue]>> {
    let mut origins = Vec::<&str>::new();
    for origin in std::iter::once(frontend_url.trim_end_matches('/')).chain(LOCAL_ORIGINS) {
        if !origin.is_empty() && !origins.contains(&origin) {
            origins.push(origin);
        }
    }

    origins
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid origin: {origin:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use portfolio_di::Provide;

    use super::*;

    #[test]
    fn provide_rest_server() {
        let config = portfolio_config::load_dev_config().unwrap();
        let config_provider = ConfigProvider::new(&config).unwrap();
        let email = crate::email::connect(&config.email);
        let mut provider = Provider::new(config_provider, email);
        let _: types::RestServer = provider.provide();
    }

    #[test]
    fn provide_resume_api() {
        let config = portfolio_config::load_dev_config().unwrap();
        let _: types::ResumeApi = ConfigProvider::new(&config).unwrap().provide();
    }

    #[test]
    fn config_durations() {
        let config = portfolio_config::load_dev_config().unwrap();
        let provider = ConfigProvider::new(&config).unwrap();

        let global = provider.rest_server_config.global_rate_limit;
        assert_eq!(global.bucket, "global");
        assert_eq!(global.max_requests, 100);
        assert_eq!(global.window, Duration::from_secs(15 * 60));

        let contact = provider.contact_feature_config.rate_limit;
        assert_eq!(contact.bucket, "contact");
        assert_eq!(contact.max_requests, 5);
        assert_eq!(contact.window, Duration::from_secs(15 * 60));

        assert_eq!(
            provider.health_feature_config.cache_ttl,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn origins() {
        let origins = allowed_origins("https://adityagupta.dev/").unwrap();
        assert_eq!(
            origins.iter().map(|o| o.to_str().unwrap()).collect::<Vec<_>>(),
            [
                "https://adityagupta.dev",
                "http://localhost:3000",
                "http://127.0.0.1:3000"
            ]
        );

        let origins = allowed_origins("http://localhost:3000").unwrap();
        assert_eq!(origins.len(), 2);

        assert!(allowed_origins("https://bad\norigin").is_err());
    }
}
