use std::sync::Arc;

use crate::redirector::Redirector;
use async_trait::async_trait;
use tinylink_core::{ReadRepository, ShortId};
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Uses a read-only repository to fetch short link records.
#[derive(Debug)]
pub struct RedirectorService<R> {
    repository: Arc<R>,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ReadRepository> RedirectorService<R> {
    /// Creates a new RedirectorService with the given repository.
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Resolves a short id to its original URL.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - The original URL if the id exists
    /// * `Ok(None)` - If the id doesn't exist or is malformed
    /// * `Err(e)` - If there was an error accessing the repository
    pub async fn resolve(&self, short_id: &str) -> crate::Result<Option<String>> {
        Redirector::resolve(self, short_id).await
    }
}

#[async_trait]
impl<R: ReadRepository> Redirector for RedirectorService<R> {
    async fn resolve(&self, short_id: &str) -> crate::Result<Option<String>> {
        let Ok(short_id) = ShortId::new(short_id) else {
            trace!(short_id, "malformed short id");
            return Ok(None);
        };

        match self.repository.find_by_short_id(&short_id).await? {
            Some(link) => {
                debug!(short_id = %short_id, url = %link.original_url, "resolved short id");
                Ok(Some(link.original_url))
            }
            None => {
                trace!(short_id = %short_id, "short id not found");
                Ok(None)
            }
        }
    }
}
