//! Crawl outcomes - the events that drive learning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one delegated crawl, as seen by the learner.
///
/// Optional signals are explicit fields defaulting to `None`/`false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub url: String,
    pub success: bool,
    pub content: Option<String>,
    pub processing_time: Duration,
    pub error: Option<String>,

    /// Quality reported by the delegate, when it computes one
    #[serde(default)]
    pub quality_score: Option<f64>,

    /// Whether the failure was a timeout
    #[serde(default)]
    pub timed_out: bool,
}

impl CrawlOutcome {
    /// A successful crawl with extracted content.
    pub fn success(url: impl Into<String>, content: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            success: true,
            content: Some(content.into()),
            processing_time: elapsed,
            error: None,
            quality_score: None,
            timed_out: false,
        }
    }

    /// A failed crawl.
    pub fn failure(url: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            success: false,
            content: None,
            processing_time: elapsed,
            error: Some(error.into()),
            quality_score: None,
            timed_out: false,
        }
    }

    /// A crawl that hit the strategy's page timeout.
    pub fn timeout(url: impl Into<String>, elapsed: Duration) -> Self {
        let url = url.into();
        let error = format!("timed out after {}s", elapsed.as_secs());
        Self {
            timed_out: true,
            ..Self::failure(url, error, elapsed)
        }
    }

    /// Attach a delegate-reported quality score.
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality_score = Some(quality);
        self
    }

    /// Content when the crawl succeeded and produced something non-blank.
    pub fn usable_content(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}
