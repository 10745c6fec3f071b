// # In-Memory Marker Store
//
// HashMap-backed marker store for tests and ephemeral runs. Clones share
// the same underlying map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::traits::MarkerStore;

/// In-memory marker store
#[derive(Debug, Clone, Default)]
pub struct MemoryMarkerStore {
    markers: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.markers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.markers.read().await.is_empty()
    }
}

#[async_trait]
impl MarkerStore for MemoryMarkerStore {
    async fn last_attempt(&self, domain: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.markers.read().await.get(domain).copied())
    }

    async fn record_attempt(&self, domain: &str, at: DateTime<Utc>) -> Result<()> {
        self.markers.write().await.insert(domain.to_string(), at);
        Ok(())
    }

    async fn clear(&self, domain: &str) -> Result<()> {
        self.markers.write().await.remove(domain);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.markers.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_overwrites() {
        let store = MemoryMarkerStore::new();
        let t1 = "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let t2 = "2025-01-08T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        store.record_attempt("example.com", t1).await.unwrap();
        store.record_attempt("example.com", t2).await.unwrap();

        assert_eq!(store.last_attempt("example.com").await.unwrap(), Some(t2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryMarkerStore::new();
        let clone = store.clone();

        clone.record_attempt("a.com", Utc::now()).await.unwrap();
        assert!(store.last_attempt("a.com").await.unwrap().is_some());

        store.clear_all().await.unwrap();
        assert!(clone.is_empty().await);
    }
}
