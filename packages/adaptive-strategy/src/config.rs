//! Learner tuning constants.

use serde::{Deserialize, Serialize};

/// Every tuned constant the learner uses.
///
/// The defaults are empirical: the asymmetric success step (+0.1 / -0.05)
/// forgets past failures slowly, and the 1.2x / 0.8x learning-rate feedback
/// is a proportional rule rather than a statistical model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Added to the success rate on a successful crawl
    pub success_step: f64,

    /// Subtracted from the success rate on a failed crawl
    pub failure_step: f64,

    /// Weight of the newest observation in exponential smoothing
    pub smoothing_factor: f64,

    /// Mean pattern effectiveness above which strategies are relaxed
    pub high_effectiveness: f64,

    /// Mean pattern effectiveness below which strategies are tightened
    pub low_effectiveness: f64,

    pub learning_rate_boost: f64,
    pub learning_rate_decay: f64,
    pub max_learning_rate: f64,
    pub min_learning_rate: f64,

    /// Quality-threshold nudge applied per adjustment
    pub quality_step: f64,
    pub min_quality_threshold: f64,
    pub max_quality_threshold: f64,

    /// Crawls faster than this produce a performance pattern
    pub fast_extraction_ms: u64,

    /// Links per hundred words that mark a page as navigation-heavy
    pub navigation_link_density: f64,

    pub high_success_rate: f64,
    pub low_success_rate: f64,

    /// Patterns returned by insights
    pub insights_top_n: usize,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            success_step: 0.1,
            failure_step: 0.05,
            smoothing_factor: 0.3,
            high_effectiveness: 0.8,
            low_effectiveness: 0.5,
            learning_rate_boost: 1.2,
            learning_rate_decay: 0.8,
            max_learning_rate: 0.5,
            min_learning_rate: 0.01,
            quality_step: 0.1,
            min_quality_threshold: 0.3,
            max_quality_threshold: 0.95,
            fast_extraction_ms: 2000,
            navigation_link_density: 5.0,
            high_success_rate: 0.8,
            low_success_rate: 0.5,
            insights_top_n: 10,
        }
    }
}

impl LearnerConfig {
    /// Set the success/failure steps.
    pub fn with_steps(mut self, success: f64, failure: f64) -> Self {
        self.success_step = success;
        self.failure_step = failure;
        self
    }

    pub fn with_smoothing_factor(mut self, factor: f64) -> Self {
        self.smoothing_factor = factor;
        self
    }

    pub fn with_fast_extraction_ms(mut self, ms: u64) -> Self {
        self.fast_extraction_ms = ms;
        self
    }

    pub fn with_insights_top_n(mut self, n: usize) -> Self {
        self.insights_top_n = n;
        self
    }

    /// `old` moved toward `new` by the smoothing factor.
    pub fn smooth(&self, old: f64, new: f64) -> f64 {
        let alpha = self.smoothing_factor.clamp(0.0, 1.0);
        old * (1.0 - alpha) + new * alpha
    }
}
