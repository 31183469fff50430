//! HitCache: thread-safe handle over the LRU engine

use std::borrow::Borrow;
use std::hash::Hash;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::lru::{LruCache, MIN_CAPACITY};
use crate::stats::{CacheStats, Counters};

/// Fixed-capacity LRU cache with per-entry hit counters
///
/// Index and recency list sit behind one `RwLock`: mutations take it
/// exclusively, every accessor takes it shared. Plain lookups never change
/// recency; call [`promote`](Self::promote) to record an access.
pub struct HitCache<K, V> {
    /// Index + recency list, always mutated together
    inner: RwLock<LruCache<K, V>>,

    /// Usage counters, only written under the write lock
    counters: Counters,
}

impl<K, V> HitCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty cache
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, at least 2
    ///
    /// # Returns
    /// * `Result<HitCache>` - `Error::InvalidCapacity` for capacities below 2
    pub fn new(capacity: u8) -> Result<Self> {
        if capacity < MIN_CAPACITY {
            warn!(capacity, "rejecting cache capacity below {}", MIN_CAPACITY);
            return Err(Error::InvalidCapacity(capacity));
        }

        debug!(capacity, "creating cache");
        Ok(Self {
            inner: RwLock::new(LruCache::new(capacity)),
            counters: Counters::default(),
        })
    }

    /// Store a value as the most recently used entry
    ///
    /// Re-inserting a present key replaces its entry outright: the value is
    /// swapped and the hit count starts again from 1.
    ///
    /// # Returns
    /// * `true` - the entry fit without evicting anything
    /// * `false` - the least recently used entry was evicted to make room
    pub fn insert(&self, key: K, value: V) -> bool {
        let mut inner = self.inner.write();
        let outcome = inner.insert(key, value);
        self.counters.record_insert(outcome);
        outcome.fits()
    }

    /// Record an access to `key`
    ///
    /// Bumps the hit count (saturating at `u8::MAX`) and moves the entry to
    /// the head. Returns `false` without side effects if the key is absent.
    pub fn promote<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.write();
        let found = inner.promote(key);
        self.counters.record_promote(found);
        found
    }

    /// Remove `key`, returning whether it was present
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.write();
        let found = inner.remove(key);
        if found {
            self.counters.record_removal();
        }
        found
    }

    /// Drop every entry and the statistics, keeping the capacity
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        let capacity = inner.capacity();
        let old = std::mem::replace(&mut *inner, LruCache::new(capacity));
        self.counters.reset();
        drop(inner);

        debug!(dropped = old.len(), "cache reset");
        drop(old);
    }

    /// Current number of entries
    pub fn len(&self) -> u8 {
        self.inner.read().len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> u8 {
        self.inner.read().capacity()
    }

    /// Key of the most recently used entry
    pub fn head_key(&self) -> Option<K> {
        self.inner.read().head_key().cloned()
    }

    /// Key of the least recently used entry, the next eviction candidate
    pub fn tail_key(&self) -> Option<K> {
        self.inner.read().tail_key().cloned()
    }

    /// Hit count of the least recently used entry, 0 when empty
    pub fn tail_hit_count(&self) -> u8 {
        self.inner.read().tail_hits()
    }

    /// Borrow the value stored under `key` without recording an access
    ///
    /// The returned guard holds the shared lock; writers block until it is
    /// dropped, so keep it short-lived.
    pub fn peek<Q>(&self, key: &Q) -> Option<MappedRwLockReadGuard<'_, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        RwLockReadGuard::try_map(self.inner.read(), |inner| inner.get(key)).ok()
    }

    /// Run `f` on the value stored under `key` without recording an access
    ///
    /// `f` runs under the shared lock and must not call back into the cache
    /// with a mutating operation.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.inner.read().get(key).map(f)
    }

    /// Check whether `key` is cached, without touching recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains(key)
    }

    /// Hit count for `key`, `None` if absent
    pub fn hit_count<Q>(&self, key: &Q) -> Option<u8>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().hits(key)
    }

    /// Key of the entry used just more recently than `key`
    ///
    /// `None` if `key` is the head or absent.
    pub fn previous_key<Q>(&self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().prev_key(key).cloned()
    }

    /// Key of the entry used just less recently than `key`
    ///
    /// `None` if `key` is the tail or absent.
    pub fn next_key<Q>(&self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().next_key(key).cloned()
    }

    /// Snapshot of all keys, most recently used first
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().keys().cloned().collect()
    }

    /// Snapshot of the usage counters
    ///
    /// Taken under the shared lock, so it never observes half of a mutation.
    pub fn stats(&self) -> CacheStats {
        let _inner = self.inner.read();
        self.counters.snapshot()
    }

    /// Check the index and recency list against each other.
    ///
    /// # Panics
    /// Panics if the structure is inconsistent, which is always a bug.
    #[doc(hidden)]
    pub fn debug_validate_invariants(&self) {
        self.inner.read().debug_validate_invariants();
    }
}

impl<K, V> HitCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Look up a value without recording an access
    ///
    /// Values that are not `Clone` can be read with [`peek`](Self::peek) or
    /// [`get_with`](Self::get_with).
    ///
    /// # Returns
    /// * `Option<V>` - A clone of the stored value, `None` if absent
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().get(key).cloned()
    }
}
