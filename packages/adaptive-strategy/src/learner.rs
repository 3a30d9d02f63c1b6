//! Adaptive learner.
//!
//! Chooses a strategy per domain from the catalog plus learned state, and
//! folds crawl outcomes back into that state.
//!
//! # Concurrency
//!
//! Writes for one domain are serialized by a per-domain lock, so the pattern
//! cap and the smoothing updates never race. Different domains never share a
//! lock. Strategy selection reads a store snapshot without taking the lock;
//! it may observe state one outcome behind, which is fine for advisory
//! tuning data.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::catalog::{base_strategy_for, merge};
use crate::classifier::classify;
use crate::config::LearnerConfig;
use crate::error::Result;
use crate::quality::{heuristic_quality_v2, TextSignals};
use crate::security::domain_of;
use crate::traits::store::DomainStore;
use crate::types::metrics::{AdaptiveAnalytics, DomainInsights, DomainState};
use crate::types::outcome::CrawlOutcome;
use crate::types::pattern::{
    mean_effectiveness, prune_to_capacity, sort_by_effectiveness, LearnedPattern, PatternCategory,
};
use crate::types::strategy::{unit, ContentType, StrategyConfig, StrategyOverride};

/// A selected strategy plus what went into choosing it.
#[derive(Debug, Clone)]
pub struct StrategySelection {
    pub domain: String,
    pub content_type: ContentType,
    pub config: StrategyConfig,

    /// Patterns known for the domain at selection time
    pub learned_patterns: usize,

    pub mean_effectiveness: Option<f64>,
}

impl StrategySelection {
    pub fn adaptation_applied(&self) -> bool {
        self.config.adapted
    }
}

/// One lock per domain, created on first use.
///
/// Entries nobody holds are dropped on the next lookup, so the table tracks
/// in-flight domains rather than every domain ever seen.
#[derive(Default)]
struct DomainLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DomainLocks {
    async fn lock_for(&self, domain: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        // Clones are only taken under the table lock, so a count of one
        // means no task holds or awaits that domain's lock.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Records per-domain outcomes and nudges strategies toward what works.
pub struct AdaptiveLearner<S: DomainStore> {
    store: S,
    config: LearnerConfig,
    locks: DomainLocks,
}

impl<S: DomainStore> AdaptiveLearner<S> {
    /// Create a learner with default tuning.
    pub fn new(store: S) -> Self {
        Self::with_config(store, LearnerConfig::default())
    }

    /// Create a learner with custom tuning.
    pub fn with_config(store: S, config: LearnerConfig) -> Self {
        Self {
            store,
            config,
            locks: DomainLocks::default(),
        }
    }

    /// Backing store for learned state.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tuning constants in use.
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Strategy for a URL, with optional caller overrides.
    ///
    /// Never fails: unknown or empty domains get the generic hybrid default,
    /// and store read errors fall back to the unadjusted config.
    pub async fn select_strategy(
        &self,
        url: &str,
        user_override: Option<&StrategyOverride>,
    ) -> StrategyConfig {
        self.select_strategy_traced(url, user_override).await.config
    }

    /// Like [`select_strategy`](Self::select_strategy), reporting how the
    /// config was derived.
    pub async fn select_strategy_traced(
        &self,
        url: &str,
        user_override: Option<&StrategyOverride>,
    ) -> StrategySelection {
        let domain = domain_of(url);
        let content_type = if domain.is_empty() {
            ContentType::Unknown
        } else {
            classify(&domain)
        };

        let base = base_strategy_for(content_type);
        let merged = match user_override {
            Some(over) => merge(&base, over),
            None => base,
        };

        let patterns = if domain.is_empty() {
            Vec::new()
        } else {
            match self.store.get_state(&domain).await {
                Ok(state) => state.map(|s| s.patterns).unwrap_or_default(),
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Failed to load learned state, using base strategy");
                    Vec::new()
                }
            }
        };

        let mean = mean_effectiveness(&patterns);
        let config = match mean {
            Some(mean) => self.adjust(merged, mean),
            None => merged,
        };

        debug!(
            domain = %domain,
            content_type = %content_type,
            kind = %config.kind,
            patterns = patterns.len(),
            adapted = config.adapted,
            "Strategy selected"
        );

        StrategySelection {
            domain,
            content_type,
            config,
            learned_patterns: patterns.len(),
            mean_effectiveness: mean,
        }
    }

    /// Proportional feedback on mean pattern effectiveness.
    fn adjust(&self, config: StrategyConfig, mean: f64) -> StrategyConfig {
        let c = &self.config;
        let lr = config.learning_rate;
        let quality = config.quality_threshold;

        let (learning_rate, quality_threshold) = if mean > c.high_effectiveness {
            (
                (lr * c.learning_rate_boost).min(c.max_learning_rate.max(lr)),
                (quality - c.quality_step).max(c.min_quality_threshold.min(quality)),
            )
        } else if mean < c.low_effectiveness {
            (
                (lr * c.learning_rate_decay).max(c.min_learning_rate.min(lr)),
                (quality + c.quality_step).min(c.max_quality_threshold.max(quality)),
            )
        } else {
            return config;
        };

        debug!(
            mean_effectiveness = mean,
            learning_rate,
            quality_threshold,
            "Adjusting strategy from learned patterns"
        );

        StrategyConfig {
            learning_rate,
            quality_threshold,
            adapted: true,
            ..config
        }
        .clamped()
    }

    /// Fold one crawl outcome into the domain's learned state.
    ///
    /// Calls for the same domain are serialized; calls for different
    /// domains proceed independently.
    pub async fn record_outcome(
        &self,
        url: &str,
        outcome: &CrawlOutcome,
        strategy_used: &StrategyConfig,
    ) -> Result<()> {
        let domain = domain_of(url);
        if domain.is_empty() {
            debug!(url = %url, "No domain to record outcome against");
            return Ok(());
        }

        let lock = self.locks.lock_for(&domain).await;
        let _guard = lock.lock().await;

        let mut state = self
            .store
            .get_state(&domain)
            .await?
            .unwrap_or_else(|| DomainState::new(&domain, strategy_used.content_type));

        self.apply_outcome(&mut state, outcome, strategy_used);
        self.store.put_state(&state).await?;

        debug!(
            domain = %domain,
            success = outcome.success,
            success_rate = state.metrics.success_rate,
            quality = state.metrics.quality_score,
            patterns = state.patterns.len(),
            "Outcome recorded"
        );

        Ok(())
    }

    fn apply_outcome(
        &self,
        state: &mut DomainState,
        outcome: &CrawlOutcome,
        strategy_used: &StrategyConfig,
    ) {
        let c = &self.config;
        let elapsed_ms = outcome.processing_time.as_millis() as u64;
        let metrics = &mut state.metrics;

        metrics.total_crawls += 1;
        metrics.last_processing_time_ms = elapsed_ms;
        metrics.avg_processing_time_ms = if metrics.total_crawls == 1 {
            elapsed_ms as f64
        } else {
            c.smooth(metrics.avg_processing_time_ms, elapsed_ms as f64)
        };
        metrics.last_updated = chrono::Utc::now();
        if strategy_used.adapted {
            metrics.patterns_applied += 1;
        }
        *state.strategy_usage.entry(strategy_used.kind).or_default() += 1;

        if !outcome.success {
            metrics.success_rate = unit(metrics.success_rate - c.failure_step);
            if outcome.timed_out {
                debug!(domain = %state.domain, "Timeout recorded as failure");
            }
            return;
        }

        metrics.successful_crawls += 1;
        metrics.success_rate = unit(metrics.success_rate + c.success_step);

        let Some(content) = outcome.usable_content() else {
            return;
        };

        let quality = outcome
            .quality_score
            .map(unit)
            .unwrap_or_else(|| heuristic_quality_v2(content));
        metrics.quality_score = unit(c.smooth(metrics.quality_score, quality));

        if strategy_used.pattern_learning {
            // Append only: a kept pattern never drops below an evicted one.
            let observations = self.observe(&state.domain, content, quality, elapsed_ms, strategy_used);
            state.patterns.extend(observations);
            let dropped = prune_to_capacity(&mut state.patterns, strategy_used.pattern_memory_size);
            if dropped > 0 {
                debug!(domain = %state.domain, dropped, "Pruned learned patterns");
            }
        }

        let efficiency = mean_effectiveness(&state.patterns).unwrap_or(0.0);
        state.metrics.learning_efficiency =
            unit(c.smooth(state.metrics.learning_efficiency, efficiency));
    }

    /// Signals worth remembering from one successful crawl.
    fn observe(
        &self,
        domain: &str,
        content: &str,
        quality: f64,
        elapsed_ms: u64,
        strategy: &StrategyConfig,
    ) -> Vec<LearnedPattern> {
        let signals = TextSignals::from_text(content);
        let content_type = strategy.content_type;
        let mut observed = Vec::new();

        if strategy.accepts_word_count(signals.words) {
            let bucket = signals.words / 100 * 100;
            observed.push(
                LearnedPattern::new(
                    format!("content:{}-{}w", bucket, bucket + 99),
                    domain,
                    content_type,
                    PatternCategory::Content,
                    quality,
                )
                .with_example(content),
            );
        }

        let fast = self.config.fast_extraction_ms;
        if fast > 0 && elapsed_ms < fast {
            let effectiveness = 1.0 - elapsed_ms as f64 / fast as f64;
            observed.push(
                LearnedPattern::new(
                    "fast_extraction",
                    domain,
                    content_type,
                    PatternCategory::Performance,
                    effectiveness,
                )
                .with_example(&format!("{}ms", elapsed_ms)),
            );
        }

        let density = signals.link_density();
        let threshold = self.config.navigation_link_density;
        if threshold > 0.0 && density >= threshold {
            observed.push(
                LearnedPattern::new(
                    "link_dense",
                    domain,
                    content_type,
                    PatternCategory::Navigation,
                    density / (2.0 * threshold),
                )
                .with_confidence(quality)
                .with_example(&format!("{:.1} links/100 words", density)),
            );
        }

        observed
    }

    /// Shrink a domain's pattern memory to `capacity`, keeping the most
    /// effective patterns. Returns how many were dropped.
    pub async fn prune_domain(&self, domain: &str, capacity: usize) -> Result<usize> {
        let domain = domain_of(domain);
        let lock = self.locks.lock_for(&domain).await;
        let _guard = lock.lock().await;
        self.store.prune_patterns(&domain, capacity.max(1)).await
    }

    /// Current metrics, top patterns and recommendations for a domain.
    pub async fn insights_for(&self, domain: &str) -> Result<DomainInsights> {
        let domain = domain_of(domain);
        let state = if domain.is_empty() {
            None
        } else {
            self.store.get_state(&domain).await?
        };

        let Some(state) = state else {
            return Ok(DomainInsights {
                domain,
                metrics: None,
                top_patterns: Vec::new(),
                mean_effectiveness: None,
                recommendations: vec![
                    "No history yet: using the base strategy for this content type".to_string(),
                ],
            });
        };

        let mean = mean_effectiveness(&state.patterns);
        let recommendations = self.recommendations(mean, state.metrics.success_rate);

        let mut top_patterns = state.patterns;
        sort_by_effectiveness(&mut top_patterns);
        top_patterns.truncate(self.config.insights_top_n);

        Ok(DomainInsights {
            domain,
            metrics: Some(state.metrics),
            top_patterns,
            mean_effectiveness: mean,
            recommendations,
        })
    }

    fn recommendations(&self, mean: Option<f64>, success_rate: f64) -> Vec<String> {
        let c = &self.config;
        let mut notes = Vec::new();

        match mean {
            Some(m) if m > c.high_effectiveness => notes.push(format!(
                "High pattern effectiveness ({:.2}): increase learning rate to adapt faster",
                m
            )),
            Some(m) if m < c.low_effectiveness => notes.push(format!(
                "Low pattern effectiveness ({:.2}): adjust strategy parameters",
                m
            )),
            Some(_) => {}
            None => notes.push("No learned patterns yet".to_string()),
        }

        if success_rate > c.high_success_rate {
            notes.push(format!(
                "High success rate ({:.2}): current strategy is performing well",
                success_rate
            ));
        } else if success_rate < c.low_success_rate {
            notes.push(format!(
                "Low success rate ({:.2}): consider longer timeouts or a different strategy",
                success_rate
            ));
        }

        notes
    }

    /// Aggregate counts across all tracked domains.
    pub async fn analytics(&self) -> Result<AdaptiveAnalytics> {
        let states = self.store.all_states().await?;
        Ok(AdaptiveAnalytics::from_states(&states))
    }
}
