use async_trait::async_trait;
use std::sync::Arc;
use tinylink_core::{
    DuplicateKey, Repository, ShortId, ShortLink, Shortener, ShortenerError, StorageError,
};
use tinylink_generator::Generator;
use tracing::{debug, error, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Default cap on candidate short ids tried for one URL.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Tuning for [`ShortenerService`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ShortenerSettings {
    /// Candidates generated before giving up with
    /// [`ShortenerError::AllocationExhausted`]. Both pre-check collisions and
    /// ids lost to a concurrent insert count as attempts. Zero is raised to
    /// one.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The identifier allocator.
///
/// Wraps a [`Repository`] and a [`Generator`] and implements find-or-create:
/// a URL that was shortened before gets its existing id back, a new URL gets
/// a fresh candidate that is checked against the store and retried on
/// collision.
///
/// Concurrent first-time requests for the same URL are reconciled by the
/// store's uniqueness constraint on `original_url`: the loser of the insert
/// race re-reads the record and returns the winner's id, so one URL never
/// ends up with two records.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            settings: self.settings,
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` with default settings.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_settings(repository, generator, ShortenerSettings::default())
    }

    pub fn with_settings(repository: R, generator: G, settings: ShortenerSettings) -> Self {
        let settings = ShortenerSettings {
            max_attempts: settings.max_attempts.max(1),
        };

        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            settings,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn settings(&self) -> ShortenerSettings {
        self.settings
    }

    /// Mints a new record for `original_url`.
    async fn allocate(&self, original_url: &str) -> Result<ShortId> {
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            let candidate: ShortId = self.generator.generate().into();

            if self.repository.exists_by_short_id(&candidate).await? {
                warn!(short_id = %candidate, attempt, "candidate short id already taken");
                continue;
            }

            let link = ShortLink::new(candidate.clone(), original_url);
            match self.repository.insert_unique(link).await {
                Ok(()) => {
                    debug!(short_id = %candidate, attempt, url = %original_url, "created short link");
                    return Ok(candidate);
                }
                Err(StorageError::Duplicate(DuplicateKey::ShortId(_))) => {
                    warn!(
                        short_id = %candidate,
                        attempt,
                        "candidate short id claimed by a concurrent insert"
                    );
                }
                Err(StorageError::Duplicate(DuplicateKey::OriginalUrl(_))) => {
                    return self.adopt_winner(original_url).await;
                }
                Err(err) => return Err(err.into()),
            }
        }

        error!(
            max_attempts,
            url = %original_url,
            "short id allocation exhausted; check generator entropy"
        );
        Err(ShortenerError::AllocationExhausted {
            attempts: max_attempts,
        })
    }

    /// Another caller inserted `original_url` between our lookup and our
    /// insert. Their record is authoritative.
    async fn adopt_winner(&self, original_url: &str) -> Result<ShortId> {
        match self.repository.find_by_url(original_url).await? {
            Some(existing) => {
                debug!(
                    short_id = %existing.short_id,
                    url = %original_url,
                    "lost insert race, returning existing short link"
                );
                Ok(existing.short_id)
            }
            None => Err(StorageError::InvalidData(format!(
                "original_url '{original_url}' reported as duplicate but not found"
            ))
            .into()),
        }
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, original_url: &str) -> Result<ShortId> {
        if let Some(existing) = self.repository.find_by_url(original_url).await? {
            trace!(short_id = %existing.short_id, "url already shortened");
            return Ok(existing.short_id);
        }

        self.allocate(original_url).await
    }

    async fn resolve(&self, short_id: &str) -> Result<Option<String>> {
        let Ok(short_id) = ShortId::new(short_id) else {
            trace!(short_id, "malformed short id cannot exist");
            return Ok(None);
        };

        Ok(self
            .repository
            .find_by_short_id(&short_id)
            .await?
            .map(|link| link.original_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tinylink_core::ReadRepository;
    use tinylink_generator::{SeqGenerator, TokenGenerator};
    use tinylink_storage::{InMemoryRepository, TimeoutRepository};

    fn test_service() -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::new(InMemoryRepository::new(), SeqGenerator::with_prefix("sq"))
    }

    /// Delegates to an in-memory store but lies in the short id pre-check,
    /// as if a concurrent writer inserted the candidate right after it.
    #[derive(Default)]
    struct BlindPrecheck {
        inner: InMemoryRepository,
    }

    #[async_trait]
    impl ReadRepository for BlindPrecheck {
        async fn find_by_short_id(
            &self,
            short_id: &ShortId,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            self.inner.find_by_short_id(short_id).await
        }

        async fn find_by_url(
            &self,
            original_url: &str,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            self.inner.find_by_url(original_url).await
        }

        async fn exists_by_short_id(
            &self,
            _short_id: &ShortId,
        ) -> tinylink_core::repository::Result<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl Repository for BlindPrecheck {
        async fn insert_unique(&self, link: ShortLink) -> tinylink_core::repository::Result<()> {
            self.inner.insert_unique(link).await
        }
    }

    /// Misses the first URL lookup, reproducing two callers that both pass
    /// the existence check before either inserts.
    struct StaleUrlLookup {
        inner: InMemoryRepository,
        missed: AtomicBool,
    }

    #[async_trait]
    impl ReadRepository for StaleUrlLookup {
        async fn find_by_short_id(
            &self,
            short_id: &ShortId,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            self.inner.find_by_short_id(short_id).await
        }

        async fn find_by_url(
            &self,
            original_url: &str,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            if !self.missed.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_url(original_url).await
        }
    }

    #[async_trait]
    impl Repository for StaleUrlLookup {
        async fn insert_unique(&self, link: ShortLink) -> tinylink_core::repository::Result<()> {
            self.inner.insert_unique(link).await
        }
    }

    /// Every operation fails as if the backend were down.
    struct DownRepository;

    #[async_trait]
    impl ReadRepository for DownRepository {
        async fn find_by_short_id(
            &self,
            _short_id: &ShortId,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn find_by_url(
            &self,
            _original_url: &str,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl Repository for DownRepository {
        async fn insert_unique(&self, _link: ShortLink) -> tinylink_core::repository::Result<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    /// Accepts calls but never answers them.
    struct StalledRepository;

    #[async_trait]
    impl ReadRepository for StalledRepository {
        async fn find_by_short_id(
            &self,
            _short_id: &ShortId,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            std::future::pending().await
        }

        async fn find_by_url(
            &self,
            _original_url: &str,
        ) -> tinylink_core::repository::Result<Option<ShortLink>> {
            std::future::pending().await
        }
    }

    #[async_trait]
    impl Repository for StalledRepository {
        async fn insert_unique(&self, _link: ShortLink) -> tinylink_core::repository::Result<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn shorten_creates_then_reuses() {
        let service = test_service();

        let first = service.shorten("https://example.com").await.unwrap();
        let second = service.shorten("https://example.com").await.unwrap();

        assert_eq!(first.as_str(), "sq000000");
        assert_eq!(first, second);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn distinct_urls_get_distinct_ids() {
        let service = test_service();

        let a = service.shorten("https://example.com/a").await.unwrap();
        let b = service.shorten("https://example.com/b").await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn urls_are_not_normalized() {
        let service = test_service();

        let plain = service.shorten("https://example.com/a").await.unwrap();
        let slash = service.shorten("https://example.com/a/").await.unwrap();

        assert_ne!(plain, slash);
    }

    #[tokio::test]
    async fn resolve_round_trips() {
        let service = ShortenerService::new(InMemoryRepository::new(), TokenGenerator::default());

        let id = service.shorten("https://example.com/a").await.unwrap();
        let url = service.resolve(id.as_str()).await.unwrap();

        assert_eq!(url.as_deref(), Some("https://example.com/a"));
    }

    #[tokio::test]
    async fn resolve_unknown_and_malformed_ids() {
        let service = test_service();

        assert_eq!(service.resolve("doesnotexist").await.unwrap(), None);
        assert_eq!(service.resolve("").await.unwrap(), None);
        assert_eq!(service.resolve("../etc/passwd").await.unwrap(), None);
    }

    #[tokio::test]
    async fn precheck_collisions_are_retried() {
        let repo = InMemoryRepository::new();
        let seed = SeqGenerator::with_prefix("sq");
        for i in 0..3 {
            let taken: ShortId = seed.generate();
            repo.insert_unique(ShortLink::new(taken, format!("https://taken{i}.example")))
                .await
                .unwrap();
        }

        let service = ShortenerService::new(repo, SeqGenerator::with_prefix("sq"));
        let id = service.shorten("https://fresh.example").await.unwrap();

        assert_eq!(id.as_str(), "sq000003");
    }

    #[tokio::test]
    async fn insert_collisions_are_retried() {
        let repo = BlindPrecheck::default();
        repo.inner
            .insert_unique(ShortLink::new(
                ShortId::new_unchecked("sq000000"),
                "https://taken.example",
            ))
            .await
            .unwrap();

        let service = ShortenerService::new(repo, SeqGenerator::with_prefix("sq"));
        let id = service.shorten("https://fresh.example").await.unwrap();

        assert_eq!(id.as_str(), "sq000001");
        assert_eq!(service.repository().inner.len(), 2);
    }

    #[tokio::test]
    async fn lost_url_race_returns_the_winner() {
        let inner = InMemoryRepository::new();
        inner
            .insert_unique(ShortLink::new(
                ShortId::new_unchecked("winner"),
                "https://example.com",
            ))
            .await
            .unwrap();
        let repo = StaleUrlLookup {
            inner,
            missed: AtomicBool::new(false),
        };

        let service = ShortenerService::new(repo, SeqGenerator::with_prefix("sq"));
        let id = service.shorten("https://example.com").await.unwrap();

        assert_eq!(id.as_str(), "winner");
        assert_eq!(service.repository().inner.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_attempts_fail() {
        let repo = InMemoryRepository::new();
        repo.insert_unique(ShortLink::new(
            ShortId::new_unchecked("fixed000000"),
            "https://taken.example",
        ))
        .await
        .unwrap();

        // The only candidate allowed is already taken.
        let generator = SeqGenerator::with_prefix("fixed");
        let settings = ShortenerSettings::builder().max_attempts(1).build();
        let service = ShortenerService::with_settings(repo, generator, settings);

        let err = service.shorten("https://fresh.example").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::AllocationExhausted { attempts: 1 }
        ));
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let service = ShortenerService::new(DownRepository, TokenGenerator::default());

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));

        let err = service.resolve("abc12345").await.unwrap_err();
        assert!(matches!(err, ShortenerError::Storage(_)));
    }

    #[tokio::test]
    async fn stalled_store_reports_timeout() {
        let repo = TimeoutRepository::new(StalledRepository, Duration::from_millis(50));
        let service = ShortenerService::new(repo, TokenGenerator::default());

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Timeout(_))
        ));

        let err = service.resolve("abc12345").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_one_candidate() {
        let settings = ShortenerSettings::builder().max_attempts(0).build();
        let service = ShortenerService::with_settings(
            InMemoryRepository::new(),
            SeqGenerator::with_prefix("sq"),
            settings,
        );

        assert_eq!(service.settings().max_attempts, 1);

        let id = service.shorten("https://example.com").await.unwrap();
        assert_eq!(id.as_str(), "sq000000");
    }

    #[test]
    fn default_settings() {
        assert_eq!(ShortenerSettings::default().max_attempts, DEFAULT_MAX_ATTEMPTS);
    }
}
