use crate::Generator;
use std::sync::atomic::{AtomicU64, Ordering};
use tinylink_core::ShortId;

/// A deterministic short id generator using a sequential counter.
///
/// Produces ids like `"sq000000"`, `"sq000001"`, ... Predictable ids are
/// unsuitable for public links, but they make collisions reproducible: a
/// store seeded with the first N ids of a fresh generator forces N
/// collisions on a second generator with the same prefix.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a sequential generator with a custom prefix.
    ///
    /// The prefix should stay within `[A-Za-z0-9_-]`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a sequential generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    type Output = ShortId;

    fn generate(&self) -> Self::Output {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortId::new_unchecked(format!("{}{:06}", self.prefix, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_ids() {
        let generator = SeqGenerator::with_prefix("sq");

        assert_eq!(generator.generate().as_str(), "sq000000");
        assert_eq!(generator.generate().as_str(), "sq000001");
        assert_eq!(generator.generate().as_str(), "sq000002");
    }

    #[test]
    fn with_offset() {
        let generator = SeqGenerator::with_offset("sq", 1000);

        assert_eq!(generator.generate().as_str(), "sq001000");
        assert_eq!(generator.generate().as_str(), "sq001001");
    }

    #[test]
    fn ids_are_valid_short_ids() {
        let generator = SeqGenerator::with_prefix("node-a");
        let id = generator.generate();
        assert!(ShortId::new(id.as_str()).is_ok());
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SeqGenerator>();
    }

    #[test]
    fn clone_preserves_counter_state() {
        let generator = SeqGenerator::with_prefix("sq");
        generator.generate();
        generator.generate();

        let cloned = generator.clone();

        assert_eq!(generator.generate().as_str(), "sq000002");
        assert_eq!(cloned.generate().as_str(), "sq000002");
    }
}
