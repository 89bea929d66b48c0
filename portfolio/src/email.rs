use portfolio_config::EmailConfig;
use portfolio_email_impl::EmailServiceImpl;

/// Create the smtp client. No connection is established until it is used.
pub fn connect(config: &EmailConfig) -> EmailServiceImpl {
    EmailServiceImpl::new(&config.smtp_url, config.from.clone())
}
