//! Request/response shapes at the crawl boundary.

use serde::{Deserialize, Serialize};

use super::strategy::{ContentType, StrategyKind, StrategyOverride};
use crate::error::{AdaptiveError, Result};
use crate::security::UrlValidator;

/// Single-URL crawl request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlRequest {
    pub url: String,
    #[serde(default)]
    pub strategy: Option<StrategyOverride>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            strategy: None,
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyOverride) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Reject the request before it reaches the learner.
    pub fn validate(&self, validator: &UrlValidator) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(AdaptiveError::InvalidRequest {
                reason: "url must not be empty".to_string(),
            });
        }
        validator.validate(&self.url)?;
        Ok(())
    }
}

/// Many URLs sharing one optional override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchCrawlRequest {
    pub urls: Vec<String>,
    #[serde(default)]
    pub strategy: Option<StrategyOverride>,
}

impl BatchCrawlRequest {
    pub fn new(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            strategy: None,
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyOverride) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Split into per-URL requests.
    pub fn requests(&self) -> Vec<CrawlRequest> {
        self.urls
            .iter()
            .map(|url| CrawlRequest {
                url: url.clone(),
                strategy: self.strategy.clone(),
            })
            .collect()
    }

    pub fn validate(&self, validator: &UrlValidator) -> Result<()> {
        if self.urls.is_empty() {
            return Err(AdaptiveError::InvalidRequest {
                reason: "urls must not be empty".to_string(),
            });
        }
        for request in self.requests() {
            request.validate(validator)?;
        }
        Ok(())
    }
}

/// Why extraction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingReason {
    /// Smart stopping: content met the quality threshold
    QualityThresholdMet,
    /// Content reached the strategy's word ceiling
    MaxWordsReached,
    /// The page had nothing more to give
    ContentExhausted,
    Timeout,
    FetchFailed,
    Cancelled,
}

/// What the adaptive layer did for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveMetadata {
    pub strategy_used: StrategyKind,
    pub content_type: ContentType,
    pub learned_patterns: usize,
    pub quality_score: f64,
    pub adaptation_applied: bool,
    pub stopping_reason: StoppingReason,
}

/// Crawl result returned to callers.
///
/// A failed fetch is still a response: `success` is false, `error` carries
/// the detail and `metadata` reports which strategy was attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub success: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub processing_time_ms: u64,
    pub metadata: AdaptiveMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_without_strategy() {
        let request: CrawlRequest =
            serde_json::from_str(r#"{"url": "https://cnn.com/world"}"#).unwrap();
        assert!(request.strategy.is_none());
    }

    #[test]
    fn test_request_rejects_malformed_override() {
        let parsed: std::result::Result<CrawlRequest, _> = serde_json::from_str(
            r#"{"url": "https://cnn.com", "strategy": {"similarity_threshold": "0.9x"}}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_and_private_urls() {
        let validator = UrlValidator::new();
        assert!(CrawlRequest::new("").validate(&validator).is_err());
        assert!(CrawlRequest::new("http://127.0.0.1/admin")
            .validate(&validator)
            .is_err());
        assert!(CrawlRequest::new("https://cnn.com/world")
            .validate(&validator)
            .is_ok());
    }

    #[test]
    fn test_batch_requests_share_override() {
        let batch = BatchCrawlRequest::new(["https://a.com", "https://b.com"])
            .with_strategy(StrategyOverride::new().with_quality_threshold(0.4));
        let requests = batch.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests
            .iter()
            .all(|r| r.strategy.as_ref().unwrap().quality_threshold == Some(0.4)));
    }

    #[test]
    fn test_stopping_reason_label() {
        let json = serde_json::to_string(&StoppingReason::QualityThresholdMet).unwrap();
        assert_eq!(json, "\"quality_threshold_met\"");
    }
}
