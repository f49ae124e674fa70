use async_trait::async_trait;
use moka::future::Cache;
use tinylink_core::cache::Result;
use tinylink_core::{ShortId, ShortLink, UrlCache};
use tracing::trace;

/// Default number of records kept by [`MokaUrlCache::new`].
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// An in-memory cache implementation using Moka.
///
/// Entries never expire: a short link cannot change once written. Only
/// capacity bounds the cache, with Moka's TinyLFU policy choosing what to
/// evict.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<ShortId, ShortLink>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding up to [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_link(&self, short_id: &ShortId) -> Result<Option<ShortLink>> {
        let hit = self.cache.get(short_id).await;
        trace!(short_id = %short_id, hit = hit.is_some(), "moka lookup");
        Ok(hit)
    }

    async fn set_link(&self, link: &ShortLink) -> Result<()> {
        self.cache
            .insert(link.short_id.clone(), link.clone())
            .await;
        trace!(short_id = %link.short_id, "cached short link in moka");
        Ok(())
    }
}
