//! Rate-limited fetcher wrapper.
//!
//! Wraps any [`PageFetcher`] with a governor quota so bursts of crawl
//! requests don't hammer upstream sites.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::FetchResult;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::strategy::StrategyConfig;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// A fetcher that waits for a permit before every request.
pub struct RateLimitedFetcher<F: PageFetcher> {
    inner: F,
    limiter: Arc<DefaultRateLimiter>,
}

impl<F: PageFetcher> RateLimitedFetcher<F> {
    /// `requests_per_second` of zero is treated as one.
    pub fn new(fetcher: F, requests_per_second: u32) -> Self {
        Self::with_quota(fetcher, Quota::per_second(non_zero(requests_per_second)))
    }

    pub fn with_quota(fetcher: F, quota: Quota) -> Self {
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &str, strategy: &StrategyConfig) -> FetchResult<FetchedPage> {
        self.limiter.until_ready().await;
        self.inner.fetch(url, strategy).await
    }
}

/// Extension trait for easy rate limiting.
pub trait FetcherExt: PageFetcher + Sized {
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedFetcher<Self> {
        RateLimitedFetcher::new(self, requests_per_second)
    }
}

impl<F: PageFetcher + Sized> FetcherExt for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::base_strategy_for;
    use crate::testing::MockFetcher;
    use crate::types::strategy::ContentType;
    use std::time::Instant;

    #[tokio::test]
    async fn test_rate_limiting() {
        let fetcher = MockFetcher::new().rate_limited(2);
        let strategy = base_strategy_for(ContentType::Blog);

        let start = Instant::now();
        for i in 0..3 {
            fetcher
                .fetch(&format!("https://example.com/{}", i), &strategy)
                .await
                .unwrap();
        }
        let elapsed = start.elapsed();

        // 2/sec: the first is immediate, the third waits ~500ms
        assert!(elapsed.as_millis() >= 400, "Rate limiting not working: {:?}", elapsed);
        assert_eq!(fetcher.inner().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_zero_rate_is_clamped() {
        let fetcher = RateLimitedFetcher::new(MockFetcher::new(), 0);
        let strategy = base_strategy_for(ContentType::Blog);
        assert!(fetcher.fetch("https://example.com", &strategy).await.is_ok());
    }
}
