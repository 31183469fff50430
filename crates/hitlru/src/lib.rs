//! # hitlru
//!
//! Fixed-capacity, in-memory LRU cache with per-entry hit counters.
//!
//! ## Architecture
//! - **Index**: AHash map from key to arena slot (O(1))
//! - **Recency list**: Doubly-linked list threaded through the arena (O(1))
//! - **Locking**: One `parking_lot::RwLock` over both, shared for reads
//!
//! Reading a value and recording an access are separate operations:
//! [`HitCache::get`] leaves recency alone, [`HitCache::promote`] moves the
//! entry to the head and bumps its hit count.
//!
//! ```
//! use hitlru::HitCache;
//!
//! let cache = HitCache::new(2)?;
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.promote("a");
//!
//! // "b" is now least recently used and is evicted first
//! assert!(!cache.insert("c", 3));
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.keys(), ["c", "a"]);
//! # Ok::<(), hitlru::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod stats;

pub use cache::HitCache;
pub use error::{Error, Result};
pub use stats::CacheStats;
