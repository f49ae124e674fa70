//! Storage backends for short link records.
//!
//! Every backend enforces uniqueness of both `short_id` and `original_url`
//! inside [`Repository::insert_unique`], so the allocator can rely on the
//! store rather than on its own pre-checks.

pub mod memory;
pub mod sqlite;
pub mod timeout;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;
pub use timeout::TimeoutRepository;
pub use tinylink_core::repository::{ReadRepository, Repository, Result, ShortLink};
pub use tinylink_core::{DuplicateKey, StorageError};
