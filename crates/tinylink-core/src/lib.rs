//! Core types and traits for the tinylink URL shortener.
//!
//! This crate provides shared types and traits used by the allocator
//! (shortener), the read path (redirector) and the storage backends.

pub mod cache;
pub mod error;
pub mod repository;
pub mod short_id;
pub mod shortener;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, DuplicateKey, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, ShortLink};
pub use short_id::ShortId;
pub use shortener::Shortener;
