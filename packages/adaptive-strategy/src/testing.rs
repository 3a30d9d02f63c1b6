//! Testing utilities including a mock fetcher.
//!
//! Useful for exercising the learner and the crawl service without making
//! network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::strategy::StrategyConfig;

/// Article text of `words` words: one ten-word sentence per paragraph.
pub fn sample_article(words: usize) -> String {
    (0..words)
        .map(|i| format!("term{}", i))
        .collect::<Vec<_>>()
        .chunks(10)
        .map(|chunk| format!("{}.", chunk.join(" ")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MockFetchCall {
    pub url: String,
    pub timeout_secs: u64,
}

/// A mock fetcher with predefined pages, failures and delays.
#[derive(Default)]
pub struct MockFetcher {
    /// Predefined pages by URL
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,

    /// URLs that should fail
    fail_urls: Arc<RwLock<Vec<String>>>,

    /// Per-URL artificial latency
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// Latency for URLs without their own delay
    default_delay: Option<Duration>,

    /// Call tracking
    calls: Arc<RwLock<Vec<MockFetchCall>>>,

    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined page, keyed by its URL.
    pub fn with_page(self, page: FetchedPage) -> Self {
        self.pages.write().unwrap().insert(page.url.clone(), page);
        self
    }

    /// Mark a URL as failing.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Delay responses for one URL.
    pub fn with_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// Delay every response that has no URL-specific delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    /// Highest number of fetches that were running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn delay_for(&self, url: &str) -> Option<Duration> {
        self.delays
            .read()
            .unwrap()
            .get(url)
            .copied()
            .or(self.default_delay)
    }
}

/// Decrements the in-flight counter even when the fetch future is dropped.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, strategy: &StrategyConfig) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(MockFetchCall {
            url: url.to_string(),
            timeout_secs: strategy.limits.max_processing_time_secs,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(self.in_flight.clone());

        if let Some(delay) = self.delay_for(url) {
            tokio::time::sleep(delay).await;
        }

        if self.fail_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Mock connection refused",
            ))));
        }

        let page = self
            .pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchedPage::new(url, sample_article(150)));
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::base_strategy_for;
    use crate::types::strategy::ContentType;

    #[tokio::test]
    async fn test_mock_fetcher_pages_and_failures() {
        let fetcher = MockFetcher::new()
            .with_page(FetchedPage::new("https://a.com", "Hello world.").with_title("A"))
            .fail_url("https://down.com");
        let strategy = base_strategy_for(ContentType::Blog);

        let page = fetcher.fetch("https://a.com", &strategy).await.unwrap();
        assert_eq!(page.title.as_deref(), Some("A"));

        let fallback = fetcher.fetch("https://other.com", &strategy).await.unwrap();
        assert!(fallback.content.split_whitespace().count() >= 150);

        assert!(fetcher.fetch("https://down.com", &strategy).await.is_err());
        assert_eq!(fetcher.calls().len(), 3);
        assert_eq!(fetcher.max_in_flight(), 1);
    }
}
