//! Error types for cowtree.
//!
//! Only caller errors live here. Broken internal invariants (unknown page
//! ids, out-of-bounds record indexes, oversized committed nodes) panic
//! instead, because no caller can recover from them.

use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All recoverable errors in cowtree.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the atomic file writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Keys must contain at least one byte; the empty key is reserved for
    /// the sentinel record.
    #[error("key must not be empty")]
    EmptyKey,

    /// Key longer than [`MAX_KEY_SIZE`](crate::common::config::MAX_KEY_SIZE).
    #[error("key length {len} exceeds maximum of {max} bytes")]
    KeyTooLarge { len: usize, max: usize },

    /// Value longer than [`MAX_VAL_SIZE`](crate::common::config::MAX_VAL_SIZE).
    #[error("value length {len} exceeds maximum of {max} bytes")]
    ValueTooLarge { len: usize, max: usize },
}
