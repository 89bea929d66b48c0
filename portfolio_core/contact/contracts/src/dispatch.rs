use std::future::Future;

use chrono::{DateTime, Utc};
use portfolio_models::contact::ContactMessage;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactDispatchService: Send + Sync + 'static {
    /// Format the message as an email to the site owner and send it.
    ///
    /// Returns the `Message-ID` of the sent email.
    fn dispatch(
        &self,
        message: &ContactMessage,
        received_at: DateTime<Utc>,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

#[cfg(feature = "mock")]
impl MockContactDispatchService {
    pub fn with_dispatch(
        mut self,
        message: ContactMessage,
        received_at: DateTime<Utc>,
        result: anyhow::Result<String>,
    ) -> Self {
        self.expect_dispatch()
            .once()
            .with(
                mockall::predicate::eq(message),
                mockall::predicate::eq(received_at),
            )
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }
}
