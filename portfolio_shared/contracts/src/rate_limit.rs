use std::time::Duration;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Counts an attempt of the client identified by `key` against `policy`
    /// and decides whether it may proceed.
    ///
    /// Rejected attempts are counted as well.
    fn acquire(&self, policy: &RateLimitPolicy, key: &str) -> RateLimitDecision;
}

/// Allow at most `max_requests` attempts per client in every fixed `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Namespace of the counters, so that independent policies do not share
    /// their windows.
    pub bucket: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window ends.
    pub reset_after: Duration,
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_acquire(
        mut self,
        policy: RateLimitPolicy,
        key: String,
        result: RateLimitDecision,
    ) -> Self {
        self.expect_acquire()
            .once()
            .with(
                mockall::predicate::eq(policy),
                mockall::predicate::eq(key),
            )
            .return_const(result);
        self
    }
}
