use std::{future::Future, net::IpAddr, time::Duration};

use chrono::{DateTime, Utc};
use portfolio_models::contact::{ContactFieldError, ContactSubmission};
use portfolio_shared_contracts::rate_limit::RateLimitDecision;
use thiserror::Error;

pub mod dispatch;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Rate limit, validate and deliver a contact form submission of the
    /// given client.
    fn send_message(
        &self,
        client: IpAddr,
        submission: ContactSubmission,
    ) -> impl Future<Output = Result<ContactDelivery, ContactSendMessageError>> + Send;

    /// Deliver a canned message, bypassing rate limiting.
    fn send_test_message(
        &self,
    ) -> impl Future<Output = Result<ContactTestDelivery, ContactSendTestMessageError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDelivery {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactTestDelivery {
    pub delivery: ContactDelivery,
    pub submission: ContactSubmission,
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error("Too many contact form submissions. Please try again later.")]
    RateLimited {
        /// Length of the rate limit window.
        window: Duration,
        decision: RateLimitDecision,
    },
    #[error("Validation failed")]
    Validation(Vec<ContactFieldError>),
    #[error("Failed to send message.")]
    Delivery(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ContactSendTestMessageError {
    #[error("Failed to send test message.")]
    Delivery(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The submission sent by [`ContactFeatureService::send_test_message`].
pub fn test_submission() -> ContactSubmission {
    ContactSubmission {
        name: "Test User".into(),
        email: "test@example.com".into(),
        subject: "Test Email from Portfolio".into(),
        message: "This is a test message to verify the Gmail API integration is working correctly."
            .into(),
    }
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        client: IpAddr,
        submission: ContactSubmission,
        result: Result<ContactDelivery, ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(
                mockall::predicate::eq(client),
                mockall::predicate::eq(submission),
            )
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_send_test_message(
        mut self,
        result: Result<ContactTestDelivery, ContactSendTestMessageError>,
    ) -> Self {
        self.expect_send_test_message()
            .once()
            .return_once(|| Box::pin(std::future::ready(result)));
        self
    }
}
