use crate::error::StorageError;
use crate::short_id::ShortId;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored short link. Records are immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    /// The short identifier, unique across all records.
    pub short_id: ShortId,
    /// The original URL, stored verbatim.
    pub original_url: String,
    /// When the record was created.
    pub created_at: Timestamp,
}

impl ShortLink {
    /// Creates a record stamped with the current time.
    pub fn new(short_id: ShortId, original_url: impl Into<String>) -> Self {
        Self {
            short_id,
            original_url: original_url.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// A read-only view of a repository.
///
/// This trait provides only the lookup operations from [`Repository`],
/// allowing the redirect path to have read-only access.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Looks up a record by its short id.
    /// Returns `None` if the id does not exist.
    async fn find_by_short_id(&self, short_id: &ShortId) -> Result<Option<ShortLink>>;

    /// Looks up a record by exact match on its original URL.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortLink>>;

    /// Checks whether a short id is already taken.
    async fn exists_by_short_id(&self, short_id: &ShortId) -> Result<bool> {
        Ok(self.find_by_short_id(short_id).await?.is_some())
    }

    /// Checks whether an original URL has already been shortened.
    async fn exists_by_url(&self, original_url: &str) -> Result<bool> {
        Ok(self.find_by_url(original_url).await?.is_some())
    }
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new record atomically.
    ///
    /// Both `short_id` and `original_url` are unique keys. A violation of
    /// either returns `Err(StorageError::Duplicate(_))` naming the key, and
    /// nothing is written.
    async fn insert_unique(&self, link: ShortLink) -> Result<()>;
}

// Lets the allocator and the redirect path share one store.
#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn find_by_short_id(&self, short_id: &ShortId) -> Result<Option<ShortLink>> {
        (**self).find_by_short_id(short_id).await
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        (**self).find_by_url(original_url).await
    }

    async fn exists_by_short_id(&self, short_id: &ShortId) -> Result<bool> {
        (**self).exists_by_short_id(short_id).await
    }

    async fn exists_by_url(&self, original_url: &str) -> Result<bool> {
        (**self).exists_by_url(original_url).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn insert_unique(&self, link: ShortLink) -> Result<()> {
        (**self).insert_unique(link).await
    }
}
