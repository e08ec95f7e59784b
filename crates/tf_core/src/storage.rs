use async_trait::async_trait;
use crate::types::CacheEntry;
use crate::Result;

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Look up the entry stored for a URL
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>>;

    /// Store an entry, replacing whatever was there for the same URL
    async fn put(&self, entry: &CacheEntry) -> Result<()>;
}
