//! Adaptive Crawl Strategy Engine
//!
//! Picks crawl settings per domain and learns from what happened. A host is
//! classified into a content type, the matching template strategy is merged
//! with caller overrides, and the result is nudged by the patterns learned
//! from earlier crawls of the same domain.
//!
//! # Design Philosophy
//!
//! - Selection never fails: unknown hosts get a generic hybrid strategy
//! - Learning is advisory: bounded scores, capped pattern memory
//! - Storage and fetching are seams the host application plugs into
//!
//! # Usage
//!
//! ```rust,ignore
//! use adaptive_strategy::{AdaptiveCrawler, AdaptiveLearner, CrawlRequest, MemoryStore};
//! use adaptive_strategy::testing::MockFetcher;
//!
//! let learner = AdaptiveLearner::new(MemoryStore::new());
//! let crawler = AdaptiveCrawler::new(learner, MockFetcher::new());
//!
//! let response = crawler.crawl(&CrawlRequest::new("https://cnn.com/world")).await;
//! let insights = crawler.insights("cnn.com").await?;
//! ```
//!
//! # Modules
//!
//! - [`classifier`] - Host to content type
//! - [`catalog`] - Template strategies and override merging
//! - [`learner`] - Strategy selection and outcome learning
//! - [`service`] - Crawl orchestration with timeouts, batching and cancellation
//! - [`quality`] - Text quality heuristics
//! - [`traits`] - Store and fetcher abstractions
//! - [`stores`] - Storage implementations (MemoryStore, SqliteStore)
//! - [`fetchers`] - Delegate fetchers (HttpFetcher, RateLimitedFetcher)
//! - [`security`] - SSRF protection
//! - [`testing`] - Mock implementations for testing

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod learner;
pub mod quality;
pub mod security;
pub mod service;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AdaptiveError, FetchError, Result, SecurityError};
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    store::DomainStore,
};
pub use types::{
    metrics::{AdaptiveAnalytics, DomainInsights, DomainMetrics, DomainState},
    outcome::CrawlOutcome,
    pattern::{LearnedPattern, PatternCategory},
    request::{AdaptiveMetadata, BatchCrawlRequest, CrawlRequest, CrawlResponse, StoppingReason},
    strategy::{ContentType, ResourceLimits, StrategyConfig, StrategyKind, StrategyOverride},
};

pub use catalog::{base_strategy_for, merge};
pub use classifier::classify;
pub use config::LearnerConfig;
pub use learner::{AdaptiveLearner, StrategySelection};
pub use quality::{heuristic_quality_v1, heuristic_quality_v2};
pub use security::{domain_of, UrlValidator};
pub use service::AdaptiveCrawler;

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

// Re-export fetchers
pub use fetchers::{FetcherExt, HttpFetcher, RateLimitedFetcher};

// Re-export testing utilities
pub use testing::MockFetcher;
