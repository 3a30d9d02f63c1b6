//! Learned patterns - scored signals about what worked for a domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::strategy::{unit, ContentType};

/// Maximum example payloads kept per pattern.
pub const MAX_PATTERN_EXAMPLES: usize = 3;

/// Maximum characters kept per example payload.
pub const MAX_EXAMPLE_CHARS: usize = 200;

/// What a pattern describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// Extracted body content fell within the strategy's bounds
    Content,
    /// Page was dense with links
    Navigation,
    /// Extraction finished under the fast-extraction cutoff
    Performance,
}

/// A single observed signal about a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    /// Selector or label identifying the signal
    pub selector: String,

    /// Confidence in the signal, `[0, 1]`
    pub confidence: f64,

    /// How many times the signal was observed
    pub frequency: u32,

    pub content_type: ContentType,

    /// Originating domain
    pub domain: String,

    pub category: PatternCategory,

    /// How useful the signal has been, `[0, 1]`
    pub effectiveness: f64,

    pub last_updated: DateTime<Utc>,

    /// Bounded sample of payloads that produced the signal
    #[serde(default)]
    pub examples: Vec<String>,
}

impl LearnedPattern {
    /// Create a pattern from a first observation.
    pub fn new(
        selector: impl Into<String>,
        domain: impl Into<String>,
        content_type: ContentType,
        category: PatternCategory,
        effectiveness: f64,
    ) -> Self {
        let effectiveness = unit(effectiveness);
        Self {
            selector: selector.into(),
            confidence: effectiveness,
            frequency: 1,
            content_type,
            domain: domain.into(),
            category,
            effectiveness,
            last_updated: Utc::now(),
            examples: Vec::new(),
        }
    }

    /// Override the initial confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = unit(confidence);
        self
    }

    /// Attach an example payload.
    pub fn with_example(mut self, example: &str) -> Self {
        self.push_example(example);
        self
    }

    fn push_example(&mut self, example: &str) {
        let trimmed: String = example.trim().chars().take(MAX_EXAMPLE_CHARS).collect();
        if trimmed.is_empty() || self.examples.contains(&trimmed) {
            return;
        }
        if self.examples.len() >= MAX_PATTERN_EXAMPLES {
            self.examples.remove(0);
        }
        self.examples.push(trimmed);
    }
}

/// Sort patterns by effectiveness, highest first.
pub fn sort_by_effectiveness(patterns: &mut [LearnedPattern]) {
    patterns.sort_by(|a, b| {
        b.effectiveness
            .partial_cmp(&a.effectiveness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Keep the `capacity` most effective patterns. Returns how many were dropped.
pub fn prune_to_capacity(patterns: &mut Vec<LearnedPattern>, capacity: usize) -> usize {
    if patterns.len() <= capacity {
        return 0;
    }
    sort_by_effectiveness(patterns);
    let dropped = patterns.len() - capacity;
    patterns.truncate(capacity);
    dropped
}

/// Mean effectiveness, or `None` when there are no patterns.
pub fn mean_effectiveness(patterns: &[LearnedPattern]) -> Option<f64> {
    if patterns.is_empty() {
        return None;
    }
    Some(patterns.iter().map(|p| p.effectiveness).sum::<f64>() / patterns.len() as f64)
}
