//! Error types for hotcache

use std::fmt;

/// Result type alias for hotcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Internal key too short to carry the 8-byte tag
    KeyTooShort(usize),

    /// Tag kind byte is neither a value nor a deletion
    InvalidValueType(u8),

    /// Sequence number does not fit in 56 bits
    SequenceOverflow(u64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::KeyTooShort(len) => write!(f, "Internal key too short: {} bytes (min 8)", len),
            Error::InvalidValueType(kind) => write!(f, "Invalid value type: {:#04x}", kind),
            Error::SequenceOverflow(seq) => {
                write!(f, "Sequence number out of range: {} (max 2^56 - 1)", seq)
            }
        }
    }
}

impl std::error::Error for Error {}
