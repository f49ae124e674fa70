use crate::error::CacheError;
use crate::repository::ShortLink;
use crate::short_id::ShortId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cache for short link records.
///
/// Records never change after insertion, so entries need no invalidation;
/// implementations only bound their size.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get a record from the cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_link(&self, short_id: &ShortId) -> Result<Option<ShortLink>>;

    /// Store a record in the cache.
    async fn set_link(&self, link: &ShortLink) -> Result<()>;
}
