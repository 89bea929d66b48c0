use std::net::IpAddr;

use anyhow::anyhow;
use portfolio_core_contact_contracts::{
    dispatch::ContactDispatchService, test_submission, ContactDelivery, ContactFeatureService,
    ContactSendMessageError, ContactSendTestMessageError, ContactTestDelivery,
};
use portfolio_di::Build;
use portfolio_models::contact::ContactSubmission;
use portfolio_shared_contracts::{
    rate_limit::{RateLimitPolicy, RateLimitService},
    time::TimeService,
};
use portfolio_utils::trace_instrument;
use tracing::{debug, info};

pub mod dispatch;

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<Time, RateLimit, Dispatch> {
    time: Time,
    rate_limit: RateLimit,
    dispatch: Dispatch,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    pub rate_limit: RateLimitPolicy,
}

impl<Time, RateLimit, Dispatch> ContactFeatureService
    for ContactFeatureServiceImpl<Time, RateLimit, Dispatch>
where
    Time: TimeService,
    RateLimit: RateLimitService,
    Dispatch: ContactDispatchService,
{
    #[trace_instrument(skip(self, submission))]
    async fn send_message(
        &self,
        client: IpAddr,
        submission: ContactSubmission,
    ) -> Result<ContactDelivery, ContactSendMessageError> {
        let decision = self
            .rate_limit
            .acquire(&self.config.rate_limit, &client.to_string());
        if !decision.allowed {
            debug!("contact rate limit exceeded");
            return Err(ContactSendMessageError::RateLimited {
                window: self.config.rate_limit.window,
                decision,
            });
        }

        let message = submission
            .validate()
            .map_err(ContactSendMessageError::Validation)?;

        let received_at = self.time.now();
        let message_id = self
            .dispatch
            .dispatch(&message, received_at)
            .await
            .map_err(ContactSendMessageError::Delivery)?;

        info!(
            name = %*message.author.name,
            email = %message.author.email,
            %message_id,
            "contact message sent"
        );

        Ok(ContactDelivery {
            message_id,
            sent_at: received_at,
        })
    }

    #[trace_instrument(skip(self))]
    async fn send_test_message(&self) -> Result<ContactTestDelivery, ContactSendTestMessageError> {
        let submission = test_submission();
        let message = submission
            .clone()
            .validate()
            .map_err(|errors| anyhow!("Invalid test submission: {errors:?}"))?;

        let received_at = self.time.now();
        let message_id = self
            .dispatch
            .dispatch(&message, received_at)
            .await
            .map_err(ContactSendTestMessageError::Delivery)?;

        info!(%message_id, "test message sent");

        Ok(ContactTestDelivery {
            delivery: ContactDelivery {
                message_id,
                sent_at: received_at,
            },
            submission,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use portfolio_core_contact_contracts::dispatch::MockContactDispatchService;
    use portfolio_demo::{
        contact::{INVALID, JANE, JANE_MESSAGE},
        CLIENT_IP_1, NOW,
    };
    use portfolio_models::contact::ContactFieldError;
    use portfolio_shared_contracts::{
        rate_limit::{MockRateLimitService, RateLimitDecision},
        time::MockTimeService,
    };
    use portfolio_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    type Sut =
        ContactFeatureServiceImpl<MockTimeService, MockRateLimitService, MockContactDispatchService>;

    const POLICY: RateLimitPolicy = RateLimitPolicy {
        bucket: "contact",
        max_requests: 5,
        window: Duration::from_secs(15 * 60),
    };

    fn decision(allowed: bool) -> RateLimitDecision {
        RateLimitDecision {
            allowed,
            limit: 5,
            remaining: if allowed { 4 } else { 0 },
            reset_after: Duration::from_secs(600),
        }
    }

    fn make_sut(
        time: MockTimeService,
        rate_limit: MockRateLimitService,
        dispatch: MockContactDispatchService,
    ) -> Sut {
        ContactFeatureServiceImpl {
            time,
            rate_limit,
            dispatch,
            config: ContactFeatureConfig { rate_limit: POLICY },
        }
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let time = MockTimeService::new().with_now(*NOW);
        let rate_limit = MockRateLimitService::new().with_acquire(
            POLICY,
            CLIENT_IP_1.to_string(),
            decision(true),
        );
        let dispatch = MockContactDispatchService::new().with_dispatch(
            JANE_MESSAGE.clone(),
            *NOW,
            Ok("abc123".into()),
        );

        let sut = make_sut(time, rate_limit, dispatch);

        // Act
        let result = sut.send_message(CLIENT_IP_1, JANE.clone()).await;

        // Assert
        assert_eq!(
            result.unwrap(),
            ContactDelivery {
                message_id: "abc123".into(),
                sent_at: *NOW,
            }
        );
    }

    #[tokio::test]
    async fn invalid_submission_is_not_dispatched() {
        // Arrange
        let rate_limit = MockRateLimitService::new().with_acquire(
            POLICY,
            CLIENT_IP_1.to_string(),
            decision(true),
        );

        let sut = make_sut(
            MockTimeService::new(),
            rate_limit,
            MockContactDispatchService::new(),
        );

        // Act
        let result = sut.send_message(CLIENT_IP_1, INVALID.clone()).await;

        // Assert
        assert_matches!(
            result,
            Err(ContactSendMessageError::Validation(errors)) if errors == &[
                ContactFieldError::NameLength,
                ContactFieldError::SubjectLength,
                ContactFieldError::MessageLength,
            ]
        );
    }

    #[tokio::test]
    async fn rate_limited() {
        // Arrange
        let rate_limit = MockRateLimitService::new().with_acquire(
            POLICY,
            CLIENT_IP_1.to_string(),
            decision(false),
        );

        let sut = make_sut(
            MockTimeService::new(),
            rate_limit,
            MockContactDispatchService::new(),
        );

        // Act
        let result = sut.send_message(CLIENT_IP_1, JANE.clone()).await;

        // Assert
        assert_matches!(
            result,
            Err(ContactSendMessageError::RateLimited { window, decision: d })
                if *window == POLICY.window && *d == decision(false)
        );
    }

    #[tokio::test]
    async fn rate_limit_applies_before_validation() {
        // Arrange
        let rate_limit = MockRateLimitService::new().with_acquire(
            POLICY,
            CLIENT_IP_1.to_string(),
            decision(false),
        );

        let sut = make_sut(
            MockTimeService::new(),
            rate_limit,
            MockContactDispatchService::new(),
        );

        // Act
        let result = sut.send_message(CLIENT_IP_1, INVALID.clone()).await;

        // Assert
        assert_matches!(result, Err(ContactSendMessageError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn delivery_failed() {
        // Arrange
        let time = MockTimeService::new().with_now(*NOW);
        let rate_limit = MockRateLimitService::new().with_acquire(
            POLICY,
            CLIENT_IP_1.to_string(),
            decision(true),
        );
        let dispatch = MockContactDispatchService::new().with_dispatch(
            JANE_MESSAGE.clone(),
            *NOW,
            Err(anyhow!("535 authentication failed")),
        );

        let sut = make_sut(time, rate_limit, dispatch);

        // Act
        let result = sut.send_message(CLIENT_IP_1, JANE.clone()).await;

        // Assert
        assert_matches!(result, Err(ContactSendMessageError::Delivery(err)) if err.to_string() == "535 authentication failed");
    }

    #[tokio::test]
    async fn test_message() {
        // Arrange
        let message = test_submission().validate().unwrap();
        let time = MockTimeService::new().with_now(*NOW);
        let dispatch =
            MockContactDispatchService::new().with_dispatch(message, *NOW, Ok("test-id".into()));

        let sut = make_sut(time, MockRateLimitService::new(), dispatch);

        // Act
        let result = sut.send_test_message().await;

        // Assert
        assert_eq!(
            result.unwrap(),
            ContactTestDelivery {
                delivery: ContactDelivery {
                    message_id: "test-id".into(),
                    sent_at: *NOW,
                },
                submission: test_submission(),
            }
        );
    }
}
