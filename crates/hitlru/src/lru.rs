//! LRU (Least Recently Used) engine
//!
//! Entries live in a slot arena. The index maps keys to slots and the
//! recency list threads the occupied slots from head (most recent) to
//! tail (least recent), so eviction, promotion and removal are O(1).
//! Nothing here is synchronized; [`HitCache`](crate::HitCache) owns the lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use tracing::trace;

/// Smallest capacity accepted at construction
pub(crate) const MIN_CAPACITY: u8 = 2;

/// How an insert found room for its entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Insertion {
    /// New key, free capacity was available
    Added,
    /// Key was present; a fresh entry took the old one's place
    Replaced,
    /// New key, the least recently used entry was evicted first
    Evicted,
}

impl Insertion {
    /// Whether the entry fit without evicting anything
    pub fn fits(self) -> bool {
        !matches!(self, Insertion::Evicted)
    }
}

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    hits: u8,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU list plus key index with fixed capacity
pub(crate) struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    size: u8,
    capacity: u8,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty engine. Capacity is validated by the caller.
    pub fn new(capacity: u8) -> Self {
        debug_assert!(capacity >= MIN_CAPACITY);

        Self {
            map: HashMap::with_capacity_and_hasher(capacity as usize, RandomState::new()),
            nodes: Vec::with_capacity(capacity as usize),
            head: None,
            tail: None,
            free_list: Vec::new(),
            size: 0,
            capacity,
        }
    }

    /// Store `value` under `key` as the most recently used entry.
    ///
    /// An existing entry for `key` is replaced by a fresh one, so its hit
    /// count starts over and nothing is evicted.
    pub fn insert(&mut self, key: K, value: V) -> Insertion {
        if let Some(idx) = self.map.remove(&key) {
            self.unlink(idx);
            self.release(idx);
            self.push_front(key, value);
            return Insertion::Replaced;
        }

        let outcome = if self.size < self.capacity {
            self.size = self.size.saturating_add(1);
            Insertion::Added
        } else {
            self.evict();
            Insertion::Evicted
        };

        self.push_front(key, value);
        outcome
    }

    /// Record an access: bump the hit count and move the entry to the head
    pub fn promote<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&idx) = self.map.get(key) else {
            return false;
        };

        if let Some(node) = &mut self.nodes[idx] {
            node.hits = node.hits.saturating_add(1);
        }
        self.move_to_front(idx);
        true
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                self.size = self.size.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Number of live entries
    pub fn len(&self) -> u8 {
        self.size
    }

    /// Maximum number of entries, fixed at construction
    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    /// Key of the most recently used entry
    pub fn head_key(&self) -> Option<&K> {
        self.head.and_then(|idx| self.node(idx)).map(|node| &node.key)
    }

    /// Key of the least recently used entry
    pub fn tail_key(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.node(idx)).map(|node| &node.key)
    }

    /// Hit count of the least recently used entry, 0 when empty
    pub fn tail_hits(&self) -> u8 {
        self.tail
            .and_then(|idx| self.node(idx))
            .map_or(0, |node| node.hits)
    }

    /// Look up a value without touching recency
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).map(|node| &node.value)
    }

    /// Check whether `key` is indexed
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Hit count for `key`, `None` if absent
    pub fn hits<Q>(&self, key: &Q) -> Option<u8>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).map(|node| node.hits)
    }

    /// Key of the entry one step closer to the head
    pub fn prev_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key)
            .and_then(|node| node.prev)
            .and_then(|idx| self.node(idx))
            .map(|node| &node.key)
    }

    /// Key of the entry one step closer to the tail
    pub fn next_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key)
            .and_then(|node| node.next)
            .and_then(|idx| self.node(idx))
            .map(|node| &node.key)
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            cache: self,
            cursor: self.head,
        }
    }

    /// Walk both directions of the list and cross-check it against the index.
    ///
    /// # Panics
    /// Panics if any structural invariant is broken.
    pub fn debug_validate_invariants(&self) {
        assert!(self.size <= self.capacity, "size exceeds capacity");
        assert_eq!(self.size as usize, self.map.len(), "size != index length");
        assert_eq!(self.head.is_none(), self.tail.is_none(), "head/tail disagree");
        assert_eq!(self.head.is_none(), self.size == 0, "empty list with live entries");

        let mut steps = 0usize;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            assert!(steps < self.map.len(), "forward walk does not terminate");
            let node = self.node(idx).expect("list links a free slot");
            assert_eq!(node.prev, prev, "broken back link");
            assert_eq!(self.map.get(&node.key), Some(&idx), "index points elsewhere");
            prev = cursor;
            cursor = node.next;
            steps += 1;
        }
        assert_eq!(prev, self.tail, "forward walk did not end at tail");
        assert_eq!(steps, self.map.len(), "list length != index length");

        let mut steps = 0usize;
        let mut cursor = self.tail;
        let mut last = None;
        while let Some(idx) = cursor {
            assert!(steps < self.map.len(), "backward walk does not terminate");
            last = cursor;
            cursor = self.node(idx).and_then(|node| node.prev);
            steps += 1;
        }
        assert_eq!(last, self.head, "backward walk did not end at head");
        assert_eq!(steps, self.map.len());

        let occupied = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.map.len(), "orphaned arena slots");
    }

    fn node(&self, idx: usize) -> Option<&Node<K, V>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn lookup<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).and_then(|&idx| self.node(idx))
    }

    fn push_front(&mut self, key: K, value: V) {
        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            hits: 1,
            prev: None,
            next: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }

        self.map.insert(key, idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        // Not the head, so the list still has a head after unlinking
        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &mut self.nodes[idx] {
            (node.prev.take(), node.next.take())
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn evict(&mut self) {
        let Some(tail_idx) = self.tail else {
            return;
        };

        self.unlink(tail_idx);
        if let Some(node) = self.nodes[tail_idx].take() {
            self.map.remove(&node.key);
            self.free_list.push(tail_idx);
            trace!(slot = tail_idx, hits = node.hits, "evicted least recently used entry");
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn release(&mut self, idx: usize) {
        if self.nodes[idx].take().is_some() {
            self.free_list.push(idx);
        }
    }
}

/// Iterator over keys in recency order, head first
pub(crate) struct Keys<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cache.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.key)
    }
}
