use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short id to the original URL.
    ///
    /// Any string is accepted; one that cannot be a short id yields `None`.
    async fn resolve(&self, short_id: &str) -> Result<Option<String>>;
}
