use async_trait::async_trait;
use tinylink_core::repository::{ReadRepository, Result, ShortLink};
use tinylink_core::{ShortId, UrlCache};
use tracing::{debug, trace, warn};

/// A read-only repository decorator that adds caching.
///
/// This implementation composes any [`ReadRepository`] with any [`UrlCache`]
/// implementation. Short id lookups check the cache first, falling back to
/// the inner repository; records found there are cached. Misses are not
/// cached, so an id created after a failed lookup resolves immediately.
///
/// Cache failures never fail a lookup: they are logged and the inner
/// repository answers instead.
#[derive(Debug, Clone)]
pub struct CachedRepository<R, C> {
    inner: R,
    cache: C,
}

impl<R: ReadRepository, C: UrlCache> CachedRepository<R, C> {
    /// Creates a new cached repository decorator.
    pub fn new(inner: R, cache: C) -> Self {
        Self { inner, cache }
    }

    /// Returns a reference to the inner repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    async fn cached(&self, short_id: &ShortId) -> Option<ShortLink> {
        match self.cache.get_link(short_id).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(
                    short_id = %short_id,
                    error = %e,
                    "cache lookup failed, falling back to inner repository"
                );
                None
            }
        }
    }
}

#[async_trait]
impl<R: ReadRepository, C: UrlCache> ReadRepository for CachedRepository<R, C> {
    async fn find_by_short_id(&self, short_id: &ShortId) -> Result<Option<ShortLink>> {
        if let Some(link) = self.cached(short_id).await {
            debug!(short_id = %short_id, "cache hit");
            return Ok(Some(link));
        }

        trace!(short_id = %short_id, "cache miss, fetching from inner repository");
        let found = self.inner.find_by_short_id(short_id).await?;

        if let Some(link) = &found {
            if let Err(e) = self.cache.set_link(link).await {
                warn!(short_id = %short_id, error = %e, "failed to populate cache");
            }
        }

        Ok(found)
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        self.inner.find_by_url(original_url).await
    }

    async fn exists_by_short_id(&self, short_id: &ShortId) -> Result<bool> {
        if self.cached(short_id).await.is_some() {
            return Ok(true);
        }
        self.inner.exists_by_short_id(short_id).await
    }

    async fn exists_by_url(&self, original_url: &str) -> Result<bool> {
        self.inner.exists_by_url(original_url).await
    }
}
