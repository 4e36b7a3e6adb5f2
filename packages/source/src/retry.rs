//! Optional retry-with-backoff around any [`HospitalFeed`].
//!
//! The fetcher itself never retries. [`RetryingFeed`] re-issues the fetch
//! on transient failures (timeouts, transport errors, HTTP 429 and 5xx)
//! with exponential backoff: `base_delay`, `2 * base_delay`,
//! `4 * base_delay`, … Permanent failures (other 4xx, invalid payloads,
//! empty results) are returned immediately.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;

use crate::{FetchError, HospitalFeed, RawRecord};

/// How many times, and how patiently, to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Wraps a feed with a [`RetryPolicy`].
pub struct RetryingFeed<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: HospitalFeed> RetryingFeed<F> {
    #[must_use]
    pub const fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<F: HospitalFeed> HospitalFeed for RetryingFeed<F> {
    async fn fetch(&self, row_limit: NonZeroU32) -> Result<Vec<RawRecord>, FetchError> {
        let max_retries = self.policy.max_retries;
        let mut attempt = 0;

        loop {
            match self.inner.fetch(row_limit).await {
                Ok(items) => return Ok(items),
                Err(e) if e.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    log::warn!("  {e}; retry {attempt}/{max_retries} in {delay:?}...");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if attempt > 0 {
                        log::error!("Fetch failed after {attempt} retries: {e}");
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Feed that replays a fixed sequence of outcomes.
    struct ScriptedFeed {
        outcomes: Mutex<Vec<Result<Vec<RawRecord>, FetchError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedFeed {
        fn new(mut outcomes: Vec<Result<Vec<RawRecord>, FetchError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl HospitalFeed for ScriptedFeed {
        async fn fetch(&self, _row_limit: NonZeroU32) -> Result<Vec<RawRecord>, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FetchError::EmptyResult))
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(100),
        }
    }

    fn one() -> NonZeroU32 {
        NonZeroU32::new(1).unwrap()
    }

    fn server_error() -> FetchError {
        FetchError::HttpStatus {
            status: 503,
            body_excerpt: String::new(),
        }
    }

    #[test]
    fn delays_double() {
        let p = policy(5);
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let feed = RetryingFeed::new(
            ScriptedFeed::new(vec![
                Err(FetchError::Timeout),
                Err(server_error()),
                Ok(vec![RawRecord::new()]),
            ]),
            policy(3),
        );
        let items = feed.fetch(one()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(feed.inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let feed = RetryingFeed::new(
            ScriptedFeed::new(vec![
                Err(FetchError::Timeout),
                Err(FetchError::Timeout),
                Err(FetchError::Timeout),
            ]),
            policy(1),
        );
        assert_eq!(feed.fetch(one()).await, Err(FetchError::Timeout));
        assert_eq!(feed.inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let feed = RetryingFeed::new(
            ScriptedFeed::new(vec![Err(FetchError::HttpStatus {
                status: 401,
                body_excerpt: "unauthorized".to_string(),
            })]),
            policy(3),
        );
        assert!(matches!(
            feed.fetch(one()).await,
            Err(FetchError::HttpStatus { status: 401, .. })
        ));
        assert_eq!(feed.inner.calls(), 1);
    }

    #[tokio::test]
    async fn zero_retries_passes_through() {
        let feed = RetryingFeed::new(ScriptedFeed::new(vec![Err(server_error())]), policy(0));
        assert_eq!(feed.fetch(one()).await, Err(server_error()));
        assert_eq!(feed.inner.calls(), 1);
    }
}
