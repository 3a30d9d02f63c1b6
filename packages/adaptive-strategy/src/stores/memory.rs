//! In-memory domain store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::traits::store::DomainStore;
use crate::types::metrics::DomainState;
use crate::types::pattern::prune_to_capacity;

/// Process-local storage for learned state.
///
/// State is lost on restart; each instance learns independently.
#[derive(Default)]
pub struct MemoryStore {
    states: RwLock<HashMap<String, DomainState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked domains.
    pub async fn domain_count(&self) -> usize {
        self.states.read().await.len()
    }

    /// Drop all learned state.
    pub async fn clear(&self) {
        self.states.write().await.clear();
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn get_state(&self, domain: &str) -> Result<Option<DomainState>> {
        Ok(self.states.read().await.get(domain).cloned())
    }

    async fn put_state(&self, state: &DomainState) -> Result<()> {
        self.states
            .write()
            .await
            .insert(state.domain.clone(), state.clone());
        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let mut domains: Vec<String> = self.states.read().await.keys().cloned().collect();
        domains.sort();
        Ok(domains)
    }

    async fn prune_patterns(&self, domain: &str, capacity: usize) -> Result<usize> {
        let mut states = self.states.write().await;
        Ok(states
            .get_mut(domain)
            .map(|state| prune_to_capacity(&mut state.patterns, capacity))
            .unwrap_or(0))
    }

    async fn all_states(&self) -> Result<Vec<DomainState>> {
        Ok(self.states.read().await.values().cloned().collect())
    }
}
