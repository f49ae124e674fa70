//! Cache implementations for the redirector service.

pub mod moka;

pub use self::moka::MokaUrlCache;
