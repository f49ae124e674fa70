use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tinylink_core::repository::{ReadRepository, Repository, Result, ShortLink};
use tinylink_core::{DuplicateKey, ShortId, StorageError};

/// In-memory implementation of the Repository trait using DashMap.
///
/// Records live in `links`, keyed by short id; `urls` is the secondary
/// index that enforces one record per original URL. An insert claims the
/// short id slot first and holds its shard lock while claiming the URL,
/// so a record is never visible through one index without the other.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    links: DashMap<ShortId, ShortLink>,
    urls: DashMap<String, ShortId>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_short_id(&self, short_id: &ShortId) -> Result<Option<ShortLink>> {
        Ok(self.links.get(short_id).map(|entry| entry.value().clone()))
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        // Clone out of the guard so no `urls` shard stays locked while
        // `links` is read.
        let Some(short_id) = self.urls.get(original_url).map(|e| e.value().clone()) else {
            return Ok(None);
        };

        match self.links.get(&short_id) {
            Some(entry) => Ok(Some(entry.value().clone())),
            None => Err(StorageError::InvalidData(format!(
                "url index points at missing short_id '{short_id}'"
            ))),
        }
    }

    async fn exists_by_short_id(&self, short_id: &ShortId) -> Result<bool> {
        Ok(self.links.contains_key(short_id))
    }

    async fn exists_by_url(&self, original_url: &str) -> Result<bool> {
        Ok(self.urls.contains_key(original_url))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_unique(&self, link: ShortLink) -> Result<()> {
        // Lock order is always links -> urls.
        let slot = match self.links.entry(link.short_id.clone()) {
            Entry::Occupied(_) => {
                return Err(StorageError::Duplicate(DuplicateKey::ShortId(
                    link.short_id.into_string(),
                )))
            }
            Entry::Vacant(slot) => slot,
        };

        match self.urls.entry(link.original_url.clone()) {
            Entry::Occupied(_) => Err(StorageError::Duplicate(DuplicateKey::OriginalUrl(
                link.original_url,
            ))),
            Entry::Vacant(url_slot) => {
                url_slot.insert(link.short_id.clone());
                slot.insert(link);
                Ok(())
            }
        }
    }
}
