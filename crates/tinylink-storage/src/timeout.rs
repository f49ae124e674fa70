use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tinylink_core::repository::{ReadRepository, Repository, Result, ShortLink};
use tinylink_core::{ShortId, StorageError};
use tracing::warn;

/// A repository decorator that bounds every operation by a deadline.
///
/// An operation that does not finish in time is abandoned and reported as
/// [`StorageError::Timeout`]. It is not retried here. An abandoned insert
/// may still have been committed by the backend.
#[derive(Debug, Clone)]
pub struct TimeoutRepository<R> {
    inner: R,
    timeout: Duration,
}

impl<R> TimeoutRepository<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        T: Send,
        F: Future<Output = Result<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "storage operation timed out"
                );
                Err(StorageError::Timeout(format!(
                    "{operation} did not complete within {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<R: ReadRepository> ReadRepository for TimeoutRepository<R> {
    async fn find_by_short_id(&self, short_id: &ShortId) -> Result<Option<ShortLink>> {
        self.bounded("find_by_short_id", self.inner.find_by_short_id(short_id))
            .await
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        self.bounded("find_by_url", self.inner.find_by_url(original_url))
            .await
    }

    async fn exists_by_short_id(&self, short_id: &ShortId) -> Result<bool> {
        self.bounded("exists_by_short_id", self.inner.exists_by_short_id(short_id))
            .await
    }

    async fn exists_by_url(&self, original_url: &str) -> Result<bool> {
        self.bounded("exists_by_url", self.inner.exists_by_url(original_url))
            .await
    }
}

#[async_trait]
impl<R: Repository> Repository for TimeoutRepository<R> {
    async fn insert_unique(&self, link: ShortLink) -> Result<()> {
        self.bounded("insert_unique", self.inner.insert_unique(link))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRepository;

    /// Never answers lookups.
    struct StalledRepository;

    #[async_trait]
    impl ReadRepository for StalledRepository {
        async fn find_by_short_id(&self, _short_id: &ShortId) -> Result<Option<ShortLink>> {
            std::future::pending().await
        }

        async fn find_by_url(&self, _original_url: &str) -> Result<Option<ShortLink>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_lookup_times_out() {
        let repo = TimeoutRepository::new(StalledRepository, Duration::from_millis(50));

        let err = repo.find_by_url("https://example.com").await.unwrap_err();
        assert!(matches!(err, StorageError::Timeout(_)));

        let err = repo
            .exists_by_short_id(&ShortId::new_unchecked("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Timeout(_)));
    }

    #[tokio::test]
    async fn fast_operations_pass_through() {
        let repo = TimeoutRepository::new(InMemoryRepository::new(), Duration::from_secs(1));
        let link = ShortLink::new(ShortId::new_unchecked("abc123"), "https://example.com");

        repo.insert_unique(link.clone()).await.unwrap();

        assert_eq!(repo.find_by_short_id(&link.short_id).await.unwrap(), Some(link));
        assert!(repo.exists_by_url("https://example.com").await.unwrap());
    }

    #[tokio::test]
    async fn inner_errors_are_not_rewritten() {
        let repo = TimeoutRepository::new(InMemoryRepository::new(), Duration::from_secs(1));
        let link = ShortLink::new(ShortId::new_unchecked("abc123"), "https://example.com");

        repo.insert_unique(link.clone()).await.unwrap();
        let err = repo.insert_unique(link).await.unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
    }
}
