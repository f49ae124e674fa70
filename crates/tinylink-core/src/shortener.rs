use crate::short_id::ShortId;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short id for `original_url`, creating one if the URL has
    /// not been shortened before.
    ///
    /// The URL is treated as an opaque key: it must already be validated,
    /// and no normalization is applied.
    async fn shorten(&self, original_url: &str) -> Result<ShortId>;

    /// Retrieves the original URL associated with the given short id.
    ///
    /// Any string is accepted; one that cannot be a short id yields `None`.
    async fn resolve(&self, short_id: &str) -> Result<Option<String>>;
}
