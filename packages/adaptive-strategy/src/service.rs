//! Crawl service.
//!
//! Glues the learner to a delegate fetcher: select a strategy, fetch under
//! the strategy's page timeout, record the outcome, answer the caller.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::base_strategy_for;
use crate::error::Result;
use crate::learner::{AdaptiveLearner, StrategySelection};
use crate::quality::{heuristic_quality_v1, word_count};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::store::DomainStore;
use crate::types::metrics::{AdaptiveAnalytics, DomainInsights};
use crate::types::outcome::CrawlOutcome;
use crate::types::request::{
    AdaptiveMetadata, BatchCrawlRequest, CrawlRequest, CrawlResponse, StoppingReason,
};
use crate::types::strategy::{ContentType, StrategyConfig, StrategyOverride};

/// Adaptive crawl front door.
///
/// # Example
///
/// ```rust,ignore
/// use adaptive_strategy::{AdaptiveCrawler, AdaptiveLearner, CrawlRequest, HttpFetcher, MemoryStore};
///
/// let crawler = AdaptiveCrawler::new(AdaptiveLearner::new(MemoryStore::new()), HttpFetcher::new());
/// let response = crawler.crawl(&CrawlRequest::new("https://cnn.com/world")).await;
/// println!("{:?}", response.metadata.strategy_used);
/// ```
pub struct AdaptiveCrawler<S: DomainStore, F: PageFetcher> {
    learner: Arc<AdaptiveLearner<S>>,
    fetcher: F,
}

impl<S: DomainStore, F: PageFetcher> AdaptiveCrawler<S, F> {
    pub fn new(learner: AdaptiveLearner<S>, fetcher: F) -> Self {
        Self::with_shared_learner(Arc::new(learner), fetcher)
    }

    /// Share one learner between several crawlers.
    pub fn with_shared_learner(learner: Arc<AdaptiveLearner<S>>, fetcher: F) -> Self {
        Self { learner, fetcher }
    }

    pub fn learner(&self) -> &Arc<AdaptiveLearner<S>> {
        &self.learner
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawl one URL. Fetch failures and timeouts come back as a response
    /// with `success: false`, never as an error.
    pub async fn crawl(&self, request: &CrawlRequest) -> CrawlResponse {
        let selection = self.select(request).await;
        let (outcome, page) = self.fetch(&request.url, &selection.config).await;
        self.finish(&selection, outcome, page).await
    }

    /// Crawl many URLs, at most the batch ceiling at a time.
    ///
    /// Responses come back in request order.
    pub async fn crawl_batch(&self, batch: &BatchCrawlRequest) -> Vec<CrawlResponse> {
        self.crawl_batch_with_cancel(batch, CancellationToken::new())
            .await
    }

    /// Like [`crawl_batch`](Self::crawl_batch), stopping early on cancel.
    ///
    /// Crawls whose fetch has not completed when the token fires report
    /// [`StoppingReason::Cancelled`] and leave no outcome behind.
    pub async fn crawl_batch_with_cancel(
        &self,
        batch: &BatchCrawlRequest,
        cancel: CancellationToken,
    ) -> Vec<CrawlResponse> {
        let concurrency = batch_concurrency(batch.strategy.as_ref());
        let semaphore = Semaphore::new(concurrency);
        let requests = batch.requests();

        info!(urls = requests.len(), concurrency, "Batch crawl starting");

        let crawls = requests.iter().map(|request| {
            let semaphore = &semaphore;
            let cancel = &cancel;
            async move {
                let selection = self.select(request).await;

                let fetched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    fetched = async {
                        let _permit = semaphore.acquire().await.ok()?;
                        Some(self.fetch(&request.url, &selection.config).await)
                    } => fetched,
                };

                match fetched {
                    Some((outcome, page)) => self.finish(&selection, outcome, page).await,
                    None => {
                        debug!(url = %request.url, "Crawl cancelled before completion");
                        cancelled_response(&request.url, &selection)
                    }
                }
            }
        });

        let responses = join_all(crawls).await;

        let succeeded = responses.iter().filter(|r| r.success).count();
        info!(
            urls = responses.len(),
            succeeded,
            cancelled = cancel.is_cancelled(),
            "Batch crawl complete"
        );

        responses
    }

    /// The strategy a crawl of `url` would use right now.
    pub async fn preview_strategy(
        &self,
        url: &str,
        user_override: Option<&StrategyOverride>,
    ) -> StrategyConfig {
        self.learner.select_strategy(url, user_override).await
    }

    pub async fn insights(&self, domain: &str) -> Result<DomainInsights> {
        self.learner.insights_for(domain).await
    }

    pub async fn analytics(&self) -> Result<AdaptiveAnalytics> {
        self.learner.analytics().await
    }

    async fn select(&self, request: &CrawlRequest) -> StrategySelection {
        self.learner
            .select_strategy_traced(&request.url, request.strategy.as_ref())
            .await
    }

    /// Delegate fetch under the strategy's page timeout.
    async fn fetch(
        &self,
        url: &str,
        strategy: &StrategyConfig,
    ) -> (CrawlOutcome, Option<FetchedPage>) {
        let started = Instant::now();
        let timeout = strategy.page_timeout();
        let result = tokio::time::timeout(timeout, self.fetcher.fetch(url, strategy)).await;
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(page)) => {
                let mut outcome = CrawlOutcome::success(url, page.content.clone(), elapsed);
                if let Some(quality) = page.quality_score {
                    outcome = outcome.with_quality(quality);
                }
                (outcome, Some(page))
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!(url = %url, error = %e, "Delegate timed out");
                (CrawlOutcome::timeout(url, elapsed), None)
            }
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "Delegate fetch failed");
                (CrawlOutcome::failure(url, e.to_string(), elapsed), None)
            }
            Err(_) => {
                warn!(url = %url, timeout_secs = timeout.as_secs(), "Crawl timed out");
                (CrawlOutcome::timeout(url, elapsed), None)
            }
        }
    }

    /// Record the outcome and build the response.
    async fn finish(
        &self,
        selection: &StrategySelection,
        outcome: CrawlOutcome,
        page: Option<FetchedPage>,
    ) -> CrawlResponse {
        if let Err(e) = self
            .learner
            .record_outcome(&outcome.url, &outcome, &selection.config)
            .await
        {
            warn!(url = %outcome.url, error = %e, "Failed to record crawl outcome");
        }

        let content = outcome.usable_content();
        let quality_score = content.map(heuristic_quality_v1).unwrap_or(0.0);
        let stopping_reason = stopping_reason(&outcome, &selection.config, quality_score);
        let processing_time_ms = outcome.processing_time.as_millis() as u64;

        info!(
            url = %outcome.url,
            success = outcome.success,
            strategy = %selection.config.kind,
            quality = quality_score,
            elapsed_ms = processing_time_ms,
            "Crawl complete"
        );

        CrawlResponse {
            success: outcome.success,
            url: outcome.url.clone(),
            content: content.map(str::to_string),
            title: page.and_then(|p| p.title),
            error: outcome.error.clone(),
            processing_time_ms,
            metadata: metadata(selection, quality_score, stopping_reason),
        }
    }
}

/// In-flight ceiling for a batch: the override's, else the generic
/// template's.
fn batch_concurrency(user_override: Option<&StrategyOverride>) -> usize {
    user_override
        .and_then(|o| o.max_concurrency)
        .unwrap_or_else(|| base_strategy_for(ContentType::Unknown).limits.max_concurrency)
        .max(1)
}

fn stopping_reason(outcome: &CrawlOutcome, strategy: &StrategyConfig, quality: f64) -> StoppingReason {
    let Some(content) = outcome.usable_content() else {
        return if outcome.timed_out {
            StoppingReason::Timeout
        } else {
            StoppingReason::FetchFailed
        };
    };

    if strategy.smart_stopping {
        if word_count(content) >= strategy.max_word_count {
            return StoppingReason::MaxWordsReached;
        }
        if quality >= strategy.quality_threshold {
            return StoppingReason::QualityThresholdMet;
        }
    }
    StoppingReason::ContentExhausted
}

fn metadata(
    selection: &StrategySelection,
    quality_score: f64,
    stopping_reason: StoppingReason,
) -> AdaptiveMetadata {
    AdaptiveMetadata {
        strategy_used: selection.config.kind,
        content_type: selection.content_type,
        learned_patterns: selection.learned_patterns,
        quality_score,
        adaptation_applied: selection.adaptation_applied(),
        stopping_reason,
    }
}

fn cancelled_response(url: &str, selection: &StrategySelection) -> CrawlResponse {
    CrawlResponse {
        success: false,
        url: url.to_string(),
        content: None,
        title: None,
        error: Some("cancelled".to_string()),
        processing_time_ms: 0,
        metadata: metadata(selection, 0.0, StoppingReason::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{sample_article, MockFetcher};
    use crate::types::strategy::StrategyKind;
    use std::time::Duration;

    fn crawler(fetcher: MockFetcher) -> AdaptiveCrawler<MemoryStore, MockFetcher> {
        AdaptiveCrawler::new(AdaptiveLearner::new(MemoryStore::new()), fetcher)
    }

    #[tokio::test]
    async fn test_crawl_success_records_outcome() {
        let crawler = crawler(MockFetcher::new().with_page(
            FetchedPage::new("https://cnn.com/world", sample_article(300)).with_title("World"),
        ));

        let response = crawler.crawl(&CrawlRequest::new("https://cnn.com/world")).await;

        assert!(response.success);
        assert_eq!(response.title.as_deref(), Some("World"));
        assert_eq!(response.metadata.strategy_used, StrategyKind::Hybrid);
        assert_eq!(response.metadata.content_type, ContentType::News);
        assert!(response.metadata.quality_score > 0.0);

        let insights = crawler.insights("cnn.com").await.unwrap();
        assert_eq!(insights.metrics.unwrap().total_crawls, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_response() {
        let crawler = crawler(MockFetcher::new().fail_url("https://down.com/"));

        let response = crawler.crawl(&CrawlRequest::new("https://down.com/")).await;

        assert!(!response.success);
        assert!(response.error.is_some());
        assert!(response.content.is_none());
        assert_eq!(response.metadata.stopping_reason, StoppingReason::FetchFailed);

        let metrics = crawler.insights("down.com").await.unwrap().metrics.unwrap();
        assert_eq!(metrics.successful_crawls, 0);
        assert!(metrics.success_rate < 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_times_out() {
        let url = "https://slow-site.com/page";
        let crawler = crawler(MockFetcher::new().with_delay(url, Duration::from_secs(120)));

        let request = CrawlRequest::new(url).with_strategy(StrategyOverride::new().with_timeout_secs(2));
        let response = crawler.crawl(&request).await;

        assert!(!response.success);
        assert_eq!(response.metadata.stopping_reason, StoppingReason::Timeout);
        assert!(response.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_smart_stopping_reasons() {
        let crawler = crawler(MockFetcher::new().with_page(FetchedPage::new(
            "https://example.com/long",
            sample_article(6000),
        )));

        let response = crawler
            .crawl(&CrawlRequest::new("https://example.com/long"))
            .await;
        assert_eq!(response.metadata.stopping_reason, StoppingReason::MaxWordsReached);

        let response = crawler
            .crawl(
                &CrawlRequest::new("https://example.com/long")
                    .with_strategy(StrategyOverride::new().with_smart_stopping(false)),
            )
            .await;
        assert_eq!(response.metadata.stopping_reason, StoppingReason::ContentExhausted);
    }

    #[test]
    fn test_batch_concurrency_defaults_to_generic_ceiling() {
        assert_eq!(
            batch_concurrency(None),
            base_strategy_for(ContentType::Unknown).limits.max_concurrency
        );
        let over = StrategyOverride::new().with_max_concurrency(2);
        assert_eq!(batch_concurrency(Some(&over)), 2);
        let zero = StrategyOverride::new().with_max_concurrency(0);
        assert_eq!(batch_concurrency(Some(&zero)), 1);
    }
}
