//! Error types for hitlru

use std::fmt;

use crate::lru::MIN_CAPACITY;

/// Result type alias for hitlru operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction
///
/// Lookups, promotions and removals never fail; a missing key is reported
/// through their `bool`/`Option` return values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Requested capacity is below the minimum usable size
    InvalidCapacity(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity(capacity) => write!(
                f,
                "Invalid cache capacity: {} (min {})",
                capacity, MIN_CAPACITY
            ),
        }
    }
}

impl std::error::Error for Error {}
