//! Redirect path of the tinylink URL shortener.
//!
//! This crate provides a [`RedirectorService`] that resolves short ids to
//! their original URLs through a read-only repository. Because short links
//! are immutable, the repository can be wrapped in a [`CachedRepository`]
//! that keeps resolved records in memory indefinitely (bounded only by
//! capacity).
//!
//! # Example
//!
//! ```rust
//! use tinylink_redirector::{CachedRepository, MokaUrlCache, Redirector, RedirectorService};
//! use tinylink_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = CachedRepository::new(InMemoryRepository::new(), MokaUrlCache::new());
//! let service = RedirectorService::new(repository);
//!
//! if let Some(url) = service.resolve("abc12345").await? {
//!     println!("Redirect to: {}", url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod redirector;
pub mod repository;
pub mod service;

pub use cache::MokaUrlCache;
pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use repository::CachedRepository;
pub use service::RedirectorService;
