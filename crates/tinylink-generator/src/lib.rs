pub mod error;
pub mod seq;
pub mod token;

pub use error::Error;
pub use seq::SeqGenerator;
pub use token::{TokenGenerator, TokenSettings};

use tinylink_core::ShortId;

/// Trait for generating candidate short ids.
///
/// Implementations are pure generators that don't interact with storage.
/// A candidate may already be taken; the allocator checks the store and
/// asks for another one on collision.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortId>;

    /// Generates a type that can be converted into a candidate short id.
    fn generate(&self) -> Self::Output;
}
