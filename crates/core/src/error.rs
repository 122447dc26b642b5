//! Error types for hashing and block verification

use thiserror::Error;

/// Errors surfaced to the caller of the hash and verification entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing, null or wrongly typed argument at a call boundary
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A fixed-length byte sequence had the wrong length
    #[error("{argument} must be exactly {expected} bytes, got {actual}")]
    InputSize {
        argument: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The memory-hard primitive could not produce a digest
    #[error("hash computation failed: {0}")]
    Computation(String),
}

/// Result type alias for BitokPoW operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Fail unless `actual` equals `expected`
    pub fn check_size(argument: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::InputSize {
                argument,
                expected,
                actual,
            })
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::Computation(format!("cannot allocate working memory: {err}"))
    }
}
