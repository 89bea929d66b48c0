use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use portfolio_di::Build;
use portfolio_shared_contracts::{
    rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimitService},
    time::TimeService,
};
use portfolio_utils::trace_instrument;
use tracing::debug;

/// Expired windows are dropped once this many counters are tracked.
const PURGE_THRESHOLD: usize = 4096;

/// In-memory fixed window rate limiter.
#[derive(Debug, Clone, Build)]
pub struct RateLimitServiceImpl<Time> {
    time: Time,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    windows: Mutex<HashMap<String, Window>>,
}

#[derive(Debug)]
struct Window {
    start: DateTime<Utc>,
    length: Duration,
    count: u32,
}

impl Window {
    fn end(&self) -> DateTime<Utc> {
        self.start + self.length
    }
}

impl<Time> RateLimitService for RateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    #[trace_instrument(skip(self))]
    fn acquire(&self, policy: &RateLimitPolicy, key: &str) -> RateLimitDecision {
        let now = self.time.now();

        let mut windows = self
            .state
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if windows.len() >= PURGE_THRESHOLD {
            windows.retain(|_, window| now < window.end());
            debug!(remaining = windows.len(), "purged expired rate limit windows");
        }

        let window = windows
            .entry(format!("{}:{key}", policy.bucket))
            .or_insert_with(|| Window {
                start: now,
                length: policy.window,
                count: 0,
            });

        if now >= window.end() {
            *window = Window {
                start: now,
                length: policy.window,
                count: 0,
            };
        }

        window.count = window.count.saturating_add(1);

        RateLimitDecision {
            allowed: window.count <= policy.max_requests,
            limit: policy.max_requests,
            remaining: policy.max_requests.saturating_sub(window.count),
            reset_after: (window.end() - now).to_std().unwrap_or_default(),
        }
    }
}
