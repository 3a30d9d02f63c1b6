//! Per-domain running aggregates and the read-only projections built on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pattern::LearnedPattern;
use super::strategy::{ContentType, StrategyKind};

/// Starting value for smoothed scores on a domain with no history.
pub const INITIAL_SCORE: f64 = 0.5;

/// Running aggregate for one domain (host).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMetrics {
    pub domain: String,

    /// Exponentially smoothed content quality
    pub quality_score: f64,

    /// Duration of the most recent attempt
    pub last_processing_time_ms: u64,

    /// Exponentially smoothed processing time
    pub avg_processing_time_ms: f64,

    /// Exponentially smoothed mean pattern effectiveness
    pub learning_efficiency: f64,

    /// Step-adjusted success rate, `[0, 1]`
    pub success_rate: f64,

    /// Outcomes recorded for strategies shaped by learned patterns
    pub patterns_applied: u64,

    pub total_crawls: u64,
    pub successful_crawls: u64,
    pub last_updated: DateTime<Utc>,
}

impl DomainMetrics {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            quality_score: INITIAL_SCORE,
            last_processing_time_ms: 0,
            avg_processing_time_ms: 0.0,
            learning_efficiency: INITIAL_SCORE,
            success_rate: INITIAL_SCORE,
            patterns_applied: 0,
            total_crawls: 0,
            successful_crawls: 0,
            last_updated: Utc::now(),
        }
    }
}

/// Everything the store keeps for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainState {
    pub domain: String,
    pub content_type: ContentType,
    pub metrics: DomainMetrics,
    #[serde(default)]
    pub patterns: Vec<LearnedPattern>,
    #[serde(default)]
    pub strategy_usage: BTreeMap<StrategyKind, u64>,
}

impl DomainState {
    pub fn new(domain: impl Into<String>, content_type: ContentType) -> Self {
        let domain = domain.into();
        Self {
            metrics: DomainMetrics::new(domain.clone()),
            domain,
            content_type,
            patterns: Vec::new(),
            strategy_usage: BTreeMap::new(),
        }
    }
}

/// Read-only view of a domain for operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainInsights {
    pub domain: String,
    pub metrics: Option<DomainMetrics>,
    pub top_patterns: Vec<LearnedPattern>,
    pub mean_effectiveness: Option<f64>,
    pub recommendations: Vec<String>,
}

/// Aggregate across all tracked domains, for dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveAnalytics {
    pub domains_tracked: usize,
    pub total_patterns: usize,
    pub total_crawls: u64,
    pub successful_crawls: u64,

    /// Fraction of recorded crawls that succeeded (0 when none recorded)
    pub success_rate: f64,

    pub strategy_distribution: BTreeMap<StrategyKind, u64>,
    pub content_type_distribution: BTreeMap<ContentType, u64>,
}

impl AdaptiveAnalytics {
    /// Fold a set of domain states into one aggregate.
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a DomainState>) -> Self {
        let mut analytics = Self::default();
        for state in states {
            analytics.domains_tracked += 1;
            analytics.total_patterns += state.patterns.len();
            analytics.total_crawls += state.metrics.total_crawls;
            analytics.successful_crawls += state.metrics.successful_crawls;
            for (kind, count) in &state.strategy_usage {
                *analytics.strategy_distribution.entry(*kind).or_default() += count;
            }
            *analytics
                .content_type_distribution
                .entry(state.content_type)
                .or_default() += 1;
        }
        if analytics.total_crawls > 0 {
            analytics.success_rate =
                analytics.successful_crawls as f64 / analytics.total_crawls as f64;
        }
        analytics
    }
}
