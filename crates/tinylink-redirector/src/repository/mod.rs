//! Repository decorators for the read path.

pub mod cached;

pub use cached::CachedRepository;
