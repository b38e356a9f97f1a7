//! Point lookup index: exact key bytes to a skip list node
//!
//! Holds only non-owning [`RawNode`] handles; the skip list owns the nodes.
//! Entries are never removed.

use std::collections::HashMap;
use ahash::RandomState;
use hotskip::RawNode;

/// Hash index from key bytes to nodes of a [`hotskip::SkipList`]
pub struct PointIndex<K, V> {
    map: HashMap<Box<[u8]>, RawNode<K, V>, RandomState>,
}

impl<K, V> PointIndex<K, V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty index sized for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Register a node that was just linked under `key`
    ///
    /// Only call after a successful insert; the list rejects duplicates, so
    /// a key is registered at most once.
    pub fn register(&mut self, key: &[u8], node: RawNode<K, V>) {
        let previous = self.map.insert(key.into(), node);
        debug_assert!(previous.is_none(), "key registered twice");
    }

    /// Exact-match lookup
    pub fn lookup(&self, key: &[u8]) -> Option<RawNode<K, V>> {
        self.map.get(key).copied()
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> Default for PointIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
