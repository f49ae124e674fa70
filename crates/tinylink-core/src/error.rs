use thiserror::Error;

/// Errors related to the core types of the URL shortener.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
}

/// The unique key an insert collided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateKey {
    /// Another record already owns this short id.
    ShortId(String),
    /// Another record already stores this original URL.
    OriginalUrl(String),
}

impl std::fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateKey::ShortId(id) => write!(f, "short_id '{id}'"),
            DuplicateKey::OriginalUrl(url) => write!(f, "original_url '{url}'"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Rejected by a uniqueness constraint. Callers are expected to handle
    /// this themselves rather than report it upwards.
    #[error("duplicate key: {0}")]
    Duplicate(DuplicateKey),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("no free short id after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}
