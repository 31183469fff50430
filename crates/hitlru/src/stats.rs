//! Cache statistics tracking
//!
//! [`HitCache`](crate::HitCache) bumps the live counters while it holds its
//! write lock and copies them out under its read lock, so a [`CacheStats`]
//! snapshot always matches some state the cache actually passed through.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::lru::Insertion;

/// Point-in-time copy of a cache's usage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Inserts that stored a key not already present, evicting or not
    pub inserts: u64,
    /// Inserts that replaced the entry of a key already present
    pub overwrites: u64,
    /// Entries dropped to make room for a new key
    pub evictions: u64,
    /// Promotions of a present key
    pub hits: u64,
    /// Promotions of an absent key
    pub misses: u64,
    /// Successful explicit removals
    pub removals: u64,
}

impl CacheStats {
    /// Share of promotions that found their key (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Entries currently accounted for by the counters
    ///
    /// Every new key adds one entry and every eviction or removal takes one
    /// away, so between resets this equals the cache length.
    pub fn resident(&self) -> u64 {
        self.inserts - self.evictions - self.removals
    }
}

/// Live counters owned by a cache handle
#[derive(Debug, Default)]
pub(crate) struct Counters {
    inserts: AtomicU64,
    overwrites: AtomicU64,
    evictions: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    removals: AtomicU64,
}

impl Counters {
    pub fn record_insert(&self, outcome: Insertion) {
        match outcome {
            Insertion::Added => bump(&self.inserts),
            Insertion::Replaced => bump(&self.overwrites),
            Insertion::Evicted => {
                bump(&self.inserts);
                bump(&self.evictions);
            }
        }
    }

    pub fn record_promote(&self, found: bool) {
        bump(if found { &self.hits } else { &self.misses });
    }

    pub fn record_removal(&self) {
        bump(&self.removals);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            inserts: self.inserts.load(Ordering::Relaxed),
            overwrites: self.overwrites.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.inserts,
            &self.overwrites,
            &self.evictions,
            &self.hits,
            &self.misses,
            &self.removals,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}
