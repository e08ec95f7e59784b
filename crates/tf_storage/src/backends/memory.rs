use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tf_core::{CacheEntry, Config, FreshnessPolicy, Result, ResultCache};
use tokio::sync::RwLock;
use tracing::debug;

use crate::StorageBackend;

/// Process-lifetime cache; everything is lost on exit.
///
/// Every write also evicts entries that have fallen out of the freshness
/// window, so a long-running server only holds results it could still serve.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    freshness: FreshnessPolicy,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_freshness(freshness: FreshnessPolicy) -> Self {
        Self {
            entries: Arc::default(),
            freshness,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn put_at(&self, entry: &CacheEntry, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| !self.freshness.should_refresh(stored.updated.as_deref(), now));
        if entries.len() < before {
            debug!("Evicted {} stale cached analyses", before - entries.len());
        }
        entries.insert(entry.url.clone(), entry.clone());
    }
}

#[async_trait]
impl StorageBackend for MemoryCache {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_freshness(config.freshness))
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(url).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        self.put_at(entry, Utc::now()).await;
        Ok(())
    }
}
