//! Strategy catalog: canonical per-content-type templates and override merging.

use crate::types::strategy::{
    ContentType, ResourceLimits, StrategyConfig, StrategyKind, StrategyOverride,
};

/// Canonical, hand-tuned defaults for a content type.
///
/// News, social, technical and ecommerce have dedicated templates; every
/// other classification gets the generic hybrid default.
pub fn base_strategy_for(content_type: ContentType) -> StrategyConfig {
    let generic = generic_strategy(content_type);

    let config = match content_type {
        ContentType::News => StrategyConfig {
            kind: StrategyKind::Hybrid,
            min_word_count: 200,
            max_word_count: 5000,
            quality_threshold: 0.8,
            duplicate_threshold: 0.9,
            similarity_threshold: 0.75,
            learning_rate: 0.1,
            adaptation_threshold: 0.7,
            ..generic
        },
        ContentType::Social => StrategyConfig {
            kind: StrategyKind::Embedding,
            min_word_count: 50,
            max_word_count: 1000,
            quality_threshold: 0.6,
            duplicate_threshold: 0.95,
            similarity_threshold: 0.85,
            learning_rate: 0.15,
            pattern_memory_size: 50,
            adaptation_threshold: 0.6,
            limits: ResourceLimits {
                max_processing_time_secs: 20,
                ..generic.limits
            },
            ..generic
        },
        ContentType::Technical => StrategyConfig {
            kind: StrategyKind::Statistical,
            min_word_count: 300,
            max_word_count: 10000,
            quality_threshold: 0.85,
            duplicate_threshold: 0.85,
            similarity_threshold: 0.7,
            learning_rate: 0.05,
            pattern_memory_size: 150,
            adaptation_threshold: 0.8,
            limits: ResourceLimits {
                max_processing_time_secs: 60,
                memory_limit_mb: 1024,
                ..generic.limits
            },
            ..generic
        },
        ContentType::Ecommerce => StrategyConfig {
            kind: StrategyKind::Hybrid,
            min_word_count: 100,
            max_word_count: 3000,
            quality_threshold: 0.7,
            duplicate_threshold: 0.8,
            similarity_threshold: 0.8,
            learning_rate: 0.1,
            smart_stopping: false,
            ..generic
        },
        ContentType::Blog | ContentType::Forum | ContentType::Unknown => generic,
    };

    config.clamped()
}

/// The generic hybrid default, tagged with the given content type.
fn generic_strategy(content_type: ContentType) -> StrategyConfig {
    StrategyConfig {
        kind: StrategyKind::Hybrid,
        content_type,
        min_word_count: 100,
        max_word_count: 5000,
        quality_threshold: 0.7,
        duplicate_threshold: 0.9,
        similarity_threshold: 0.8,
        learning_rate: 0.1,
        pattern_memory_size: 100,
        adaptation_threshold: 0.7,
        smart_stopping: true,
        pattern_learning: true,
        limits: ResourceLimits::default(),
        adapted: false,
    }
}

/// Apply an override to a base config.
///
/// Total: only present fields replace base fields, and the result is clamped
/// instead of rejected when a value is out of range.
pub fn merge(base: &StrategyConfig, over: &StrategyOverride) -> StrategyConfig {
    let limits = ResourceLimits {
        max_processing_time_secs: over
            .max_processing_time_secs
            .unwrap_or(base.limits.max_processing_time_secs),
        memory_limit_mb: over.memory_limit_mb.unwrap_or(base.limits.memory_limit_mb),
        max_concurrency: over.max_concurrency.unwrap_or(base.limits.max_concurrency),
    };

    StrategyConfig {
        kind: over.kind.unwrap_or(base.kind),
        content_type: base.content_type,
        min_word_count: over.min_word_count.unwrap_or(base.min_word_count),
        max_word_count: over.max_word_count.unwrap_or(base.max_word_count),
        quality_threshold: over.quality_threshold.unwrap_or(base.quality_threshold),
        duplicate_threshold: over.duplicate_threshold.unwrap_or(base.duplicate_threshold),
        similarity_threshold: over
            .similarity_threshold
            .unwrap_or(base.similarity_threshold),
        learning_rate: over.learning_rate.unwrap_or(base.learning_rate),
        pattern_memory_size: over.pattern_memory_size.unwrap_or(base.pattern_memory_size),
        adaptation_threshold: over
            .adaptation_threshold
            .unwrap_or(base.adaptation_threshold),
        smart_stopping: over.smart_stopping.unwrap_or(base.smart_stopping),
        pattern_learning: over.pattern_learning.unwrap_or(base.pattern_learning),
        limits,
        adapted: base.adapted,
    }
    .clamped()
}
