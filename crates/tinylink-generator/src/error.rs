use thiserror::Error;

/// Errors returned when a generator is configured with unusable settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("entropy must be at least one byte")]
    NoEntropy,
    #[error("length {length} is out of range; at most {max_length} characters are available from {entropy_bytes} bytes")]
    InvalidLength {
        length: usize,
        entropy_bytes: usize,
        max_length: usize,
    },
}
