//! Cursors over a [`SkipList`]
//!
//! There are no back pointers: stepping backwards re-searches from the head
//! for the last node before the current key, so it costs O(log n).

use std::borrow::Borrow;
use std::fmt;

use crate::skiplist::{Node, NodeRef, SkipList};

/// Positioned cursor over a skip list
///
/// A new cursor is not valid until one of the seek methods is called.
/// Nodes are never removed, so a cursor stays usable while inserts run,
/// but payload mutation through interior mutability is visible to it.
pub struct Iter<'a, K, V> {
    list: &'a SkipList<K, V>,
    node: Option<&'a Node<K, V>>,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    pub(crate) fn new(list: &'a SkipList<K, V>) -> Self {
        Self { list, node: None }
    }

    /// Returns true iff the cursor is positioned at a node
    pub fn valid(&self) -> bool {
        self.node.is_some()
    }

    /// Node at the current position
    pub fn node(&self) -> Option<NodeRef<'a, K, V>> {
        self.node.map(|n| NodeRef::new(n, self.list.id()))
    }

    /// Key at the current position
    pub fn key(&self) -> Option<&'a K> {
        self.node.map(|n| &n.key)
    }

    /// Payload at the current position
    pub fn value(&self) -> Option<&'a V> {
        self.node.map(|n| &n.value)
    }

    /// Advance to the next node. No-op on an invalid cursor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if let Some(n) = self.node {
            self.node = self.list.next_of(Some(n), 0);
        }
    }

    /// Step back to the previous node. No-op on an invalid cursor.
    pub fn prev(&mut self) {
        if let Some(n) = self.node {
            self.node = self.list.find_less_than_node(&n.key);
        }
    }

    /// Position at the first node with a key `>= target`
    pub fn seek<Q>(&mut self, target: &Q)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.node = self.list.find_greater_or_equal_node(target, None);
    }

    /// Position at the first node. Valid iff the list is not empty.
    pub fn seek_to_first(&mut self) {
        self.node = self.list.next_of(None, 0);
    }

    /// Position at the last node. Valid iff the list is not empty.
    pub fn seek_to_last(&mut self) {
        self.node = self.list.find_last_node();
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            node: self.node,
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("key", &self.node.map(|n| &n.key))
            .finish()
    }
}

/// Ascending iterator over linked nodes
pub struct Entries<'a, K, V> {
    list: &'a SkipList<K, V>,
    next: Option<&'a Node<K, V>>,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new(list: &'a SkipList<K, V>, first: Option<&'a Node<K, V>>) -> Self {
        Self { list, next: first }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = NodeRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = self.list.next_of(Some(node), 0);
        Some(NodeRef::new(node, self.list.id()))
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a SkipList<K, V> {
    type Item = NodeRef<'a, K, V>;
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
