//! Strategy configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Extraction strategy family handed to the delegate crawler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Term-frequency based relevance scoring
    Statistical,
    /// Embedding similarity scoring
    Embedding,
    /// Statistical first pass, embedding refinement
    Hybrid,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Statistical => "statistical",
            StrategyKind::Embedding => "embedding",
            StrategyKind::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-type bucket a domain is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    News,
    Social,
    Technical,
    Ecommerce,
    Blog,
    Forum,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::News => "news",
            ContentType::Social => "social",
            ContentType::Technical => "technical",
            ContentType::Ecommerce => "ecommerce",
            ContentType::Blog => "blog",
            ContentType::Forum => "forum",
            ContentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource ceilings applied to a single crawl (and to batches).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Page timeout for the delegated fetch, in seconds
    pub max_processing_time_secs: u64,

    /// Ceiling on a fetched page body, in megabytes
    pub memory_limit_mb: u64,

    /// Maximum number of in-flight crawls in a batch
    pub max_concurrency: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_processing_time_secs: 30,
            memory_limit_mb: 512,
            max_concurrency: 5,
        }
    }
}

impl ResourceLimits {
    fn clamped(self) -> Self {
        Self {
            max_processing_time_secs: self.max_processing_time_secs.max(1),
            memory_limit_mb: self.memory_limit_mb.max(1),
            max_concurrency: self.max_concurrency.max(1),
        }
    }
}

/// How a crawl should be tuned.
///
/// Instances are values: the catalog and learner always hand out fresh,
/// clamped copies. Bounded fields live in `[0, 1]` and
/// `min_word_count <= max_word_count` holds after [`StrategyConfig::clamped`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub content_type: ContentType,
    pub min_word_count: usize,
    pub max_word_count: usize,
    pub quality_threshold: f64,
    pub duplicate_threshold: f64,
    pub similarity_threshold: f64,
    pub learning_rate: f64,
    pub pattern_memory_size: usize,
    pub adaptation_threshold: f64,
    pub smart_stopping: bool,
    pub pattern_learning: bool,
    pub limits: ResourceLimits,

    /// Set when learned per-domain adjustments shaped this instance.
    #[serde(default)]
    pub adapted: bool,
}

impl StrategyConfig {
    /// Clamp every bounded field into its documented range.
    pub fn clamped(self) -> Self {
        let min_word_count = self.min_word_count;
        Self {
            min_word_count,
            max_word_count: self.max_word_count.max(min_word_count),
            quality_threshold: unit(self.quality_threshold),
            duplicate_threshold: unit(self.duplicate_threshold),
            similarity_threshold: unit(self.similarity_threshold),
            learning_rate: unit(self.learning_rate),
            pattern_memory_size: self.pattern_memory_size.max(1),
            adaptation_threshold: unit(self.adaptation_threshold),
            limits: self.limits.clamped(),
            ..self
        }
    }

    /// Page timeout for the delegated fetch.
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.max_processing_time_secs)
    }

    /// Largest page body the delegate may buffer, in bytes.
    pub fn body_limit_bytes(&self) -> u64 {
        self.limits.memory_limit_mb.saturating_mul(1024 * 1024)
    }

    /// Whether a word count falls inside this strategy's bounds.
    pub fn accepts_word_count(&self, words: usize) -> bool {
        words >= self.min_word_count && words <= self.max_word_count
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Partial strategy supplied by a caller; present fields replace the base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyOverride {
    pub kind: Option<StrategyKind>,
    pub min_word_count: Option<usize>,
    pub max_word_count: Option<usize>,
    pub quality_threshold: Option<f64>,
    pub duplicate_threshold: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub learning_rate: Option<f64>,
    pub pattern_memory_size: Option<usize>,
    pub adaptation_threshold: Option<f64>,
    pub smart_stopping: Option<bool>,
    pub pattern_learning: Option<bool>,
    pub max_processing_time_secs: Option<u64>,
    pub memory_limit_mb: Option<u64>,
    pub max_concurrency: Option<usize>,
}

impl StrategyOverride {
    /// Create an empty override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extraction strategy kind.
    pub fn with_kind(mut self, kind: StrategyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the quality threshold, clamped into `[0, 1]` on merge.
    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    /// Set the similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Set the accepted word-count range.
    pub fn with_word_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_word_count = Some(min);
        self.max_word_count = Some(max);
        self
    }

    /// Set the learning rate.
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }

    /// Set how many learned patterns a domain keeps.
    pub fn with_pattern_memory_size(mut self, size: usize) -> Self {
        self.pattern_memory_size = Some(size);
        self
    }

    /// Set the page timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.max_processing_time_secs = Some(secs);
        self
    }

    /// Set the batch concurrency ceiling.
    pub fn with_max_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = Some(concurrency);
        self
    }

    /// Enable or disable truncation at the word ceiling.
    pub fn with_smart_stopping(mut self, enabled: bool) -> Self {
        self.smart_stopping = Some(enabled);
        self
    }
}
