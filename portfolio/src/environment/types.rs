use portfolio_api_rest::RestServer as RestServerImpl;
use portfolio_core_contact_impl::{dispatch::ContactDispatchServiceImpl, ContactFeatureServiceImpl};
use portfolio_core_health_impl::HealthFeatureServiceImpl;
use portfolio_email_impl::EmailServiceImpl;
use portfolio_extern_impl::resume::ResumeApiServiceImpl;
use portfolio_shared_impl::{rate_limit::RateLimitServiceImpl, time::TimeServiceImpl};
use portfolio_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = RestServerImpl<HealthFeature, ContactFeature, RateLimit>;

// Email
pub type Email = EmailServiceImpl;

// Templates
pub type Template = TemplateServiceImpl;

// Extern
pub type ResumeApi = ResumeApiServiceImpl;

// Shared
pub type Time = TimeServiceImpl;
pub type RateLimit = RateLimitServiceImpl<Time>;

// Core
pub type ContactDispatch = ContactDispatchServiceImpl<Email, Template>;
pub type ContactFeature = ContactFeatureServiceImpl<Time, RateLimit, ContactDispatch>;
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;
