//! Delegate crawl collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FetchResult;
use crate::types::strategy::StrategyConfig;

/// A page returned by the delegate crawler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL (after redirects)
    pub url: String,

    /// Extracted content, usually markdown
    pub content: String,

    pub title: Option<String>,

    /// Delegate-provided metadata (HTTP status, headers, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Quality score, when the delegate computes one
    #[serde(default)]
    pub quality_score: Option<f64>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            title: None,
            metadata: HashMap::new(),
            quality_score: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality_score = Some(quality);
        self
    }
}

/// Fetches and extracts a page, tuned by a strategy.
///
/// Timeouts are enforced by the caller using the strategy's page timeout;
/// implementations may also honour it themselves.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, strategy: &StrategyConfig) -> FetchResult<FetchedPage>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str, strategy: &StrategyConfig) -> FetchResult<FetchedPage> {
        (**self).fetch(url, strategy).await
    }
}
