//! SQLite domain store.
//!
//! File-backed persistence so learned state survives restarts. Good for
//! single-instance deployments; metrics and patterns are stored as JSON.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{AdaptiveError, Result};
use crate::traits::store::DomainStore;
use crate::types::metrics::DomainState;

/// SQLite-backed [`DomainStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and run migrations.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./adaptive.db?mode=rwc` - Create if not exists
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(AdaptiveError::storage)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// In-memory database (for testing). Single connection so every query
    /// sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(AdaptiveError::storage)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS domain_states (
                domain TEXT PRIMARY KEY,
                content_type TEXT NOT NULL,
                metrics TEXT NOT NULL,
                patterns TEXT NOT NULL DEFAULT '[]',
                strategy_usage TEXT NOT NULL DEFAULT '{}',
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(AdaptiveError::storage)?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct DomainStateRow {
    domain: String,
    content_type: String,
    metrics: String,
    patterns: String,
    strategy_usage: String,
}

impl DomainStateRow {
    fn into_state(self) -> Result<DomainState> {
        Ok(DomainState {
            domain: self.domain,
            content_type: serde_json::from_value(serde_json::Value::String(self.content_type))?,
            metrics: serde_json::from_str(&self.metrics)?,
            patterns: serde_json::from_str(&self.patterns)?,
            strategy_usage: serde_json::from_str(&self.strategy_usage)?,
        })
    }
}

#[async_trait]
impl DomainStore for SqliteStore {
    async fn get_state(&self, domain: &str) -> Result<Option<DomainState>> {
        let row = sqlx::query_as::<_, DomainStateRow>(
            "SELECT domain, content_type, metrics, patterns, strategy_usage FROM domain_states WHERE domain = ?",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(AdaptiveError::storage)?;

        row.map(DomainStateRow::into_state).transpose()
    }

    async fn put_state(&self, state: &DomainState) -> Result<()> {
        let metrics = serde_json::to_string(&state.metrics)?;
        let patterns = serde_json::to_string(&state.patterns)?;
        let strategy_usage = serde_json::to_string(&state.strategy_usage)?;

        sqlx::query(
            r#"
            INSERT INTO domain_states (domain, content_type, metrics, patterns, strategy_usage, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(domain) DO UPDATE SET
                content_type = excluded.content_type,
                metrics = excluded.metrics,
                patterns = excluded.patterns,
                strategy_usage = excluded.strategy_usage,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&state.domain)
        .bind(state.content_type.as_str())
        .bind(&metrics)
        .bind(&patterns)
        .bind(&strategy_usage)
        .bind(state.metrics.last_updated.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(AdaptiveError::storage)?;

        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let domains: Vec<(String,)> =
            sqlx::query_as("SELECT domain FROM domain_states ORDER BY domain")
                .fetch_all(&self.pool)
                .await
                .map_err(AdaptiveError::storage)?;

        Ok(domains.into_iter().map(|(d,)| d).collect())
    }

    async fn all_states(&self) -> Result<Vec<DomainState>> {
        let rows = sqlx::query_as::<_, DomainStateRow>(
            "SELECT domain, content_type, metrics, patterns, strategy_usage FROM domain_states",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AdaptiveError::storage)?;

        rows.into_iter().map(DomainStateRow::into_state).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pattern::{LearnedPattern, PatternCategory};
    use crate::types::strategy::{ContentType, StrategyKind};

    #[tokio::test]
    async fn test_round_trips_state() {
        let store = SqliteStore::in_memory().await.unwrap();

        let mut state = DomainState::new("cnn.com", ContentType::News);
        state.metrics.success_rate = 0.9;
        state.patterns.push(LearnedPattern::new(
            "content:200-299w",
            "cnn.com",
            ContentType::News,
            PatternCategory::Content,
            0.8,
        ));
        state.strategy_usage.insert(StrategyKind::Hybrid, 3);

        store.put_state(&state).await.unwrap();
        let loaded = store.get_state("cnn.com").await.unwrap().unwrap();

        assert_eq!(loaded.content_type, ContentType::News);
        assert_eq!(loaded.patterns.len(), 1);
        assert_eq!(loaded.strategy_usage[&StrategyKind::Hybrid], 3);
        assert!((loaded.metrics.success_rate - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_prune_uses_default_impl() {
        let store = SqliteStore::in_memory().await.unwrap();

        let mut state = DomainState::new("a.com", ContentType::Blog);
        for (i, score) in [0.2, 0.8, 0.5].iter().enumerate() {
            state.patterns.push(LearnedPattern::new(
                format!("p{}", i),
                "a.com",
                ContentType::Blog,
                PatternCategory::Content,
                *score,
            ));
        }
        store.put_state(&state).await.unwrap();

        assert_eq!(store.prune_patterns("a.com", 1).await.unwrap(), 2);
        let loaded = store.get_state("a.com").await.unwrap().unwrap();
        assert_eq!(loaded.patterns[0].effectiveness, 0.8);
        assert_eq!(store.list_domains().await.unwrap(), vec!["a.com"]);
    }
}
