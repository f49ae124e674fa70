//! The identifier allocator.
//!
//! [`ShortenerService`] implements the find-or-create contract of
//! [`tinylink_core::Shortener`] on top of any [`tinylink_core::Repository`]
//! and candidate [`tinylink_generator::Generator`].

pub mod service;

pub use service::{ShortenerService, ShortenerSettings, DEFAULT_MAX_ATTEMPTS};
