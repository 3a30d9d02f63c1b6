//! Storage trait for per-domain learned state.
//!
//! The learner owns concurrency discipline (one writer per domain); stores
//! only need to make individual calls atomic.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::metrics::DomainState;
use crate::types::pattern::prune_to_capacity;

/// Pluggable key-value storage for [`DomainState`], keyed by domain.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Get the state for a domain.
    async fn get_state(&self, domain: &str) -> Result<Option<DomainState>>;

    /// Insert or replace the state for `state.domain`.
    async fn put_state(&self, state: &DomainState) -> Result<()>;

    /// List every tracked domain.
    async fn list_domains(&self) -> Result<Vec<String>>;

    /// Keep only the `capacity` most effective patterns for a domain.
    ///
    /// Returns how many patterns were dropped.
    async fn prune_patterns(&self, domain: &str, capacity: usize) -> Result<usize> {
        let Some(mut state) = self.get_state(domain).await? else {
            return Ok(0);
        };
        let dropped = prune_to_capacity(&mut state.patterns, capacity);
        if dropped > 0 {
            self.put_state(&state).await?;
        }
        Ok(dropped)
    }

    /// Snapshot of every tracked domain.
    async fn all_states(&self) -> Result<Vec<DomainState>> {
        let domains = self.list_domains().await?;
        let mut states = Vec::with_capacity(domains.len());
        for domain in domains {
            if let Some(state) = self.get_state(&domain).await? {
                states.push(state);
            }
        }
        Ok(states)
    }
}

#[async_trait]
impl<T: DomainStore + ?Sized> DomainStore for Arc<T> {
    async fn get_state(&self, domain: &str) -> Result<Option<DomainState>> {
        (**self).get_state(domain).await
    }

    async fn put_state(&self, state: &DomainState) -> Result<()> {
        (**self).put_state(state).await
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        (**self).list_domains().await
    }

    async fn prune_patterns(&self, domain: &str, capacity: usize) -> Result<usize> {
        (**self).prune_patterns(domain, capacity).await
    }

    async fn all_states(&self) -> Result<Vec<DomainState>> {
        (**self).all_states().await
    }
}
