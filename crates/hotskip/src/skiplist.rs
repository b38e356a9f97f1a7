//! Skip list core: nodes, towers, insert and descent
//!
//! ```text
//! level 2:  head ───────────────► c ──────────────► nil
//! level 1:  head ──────► b ─────► c ──────► e ────► nil
//! level 0:  head ► a ──► b ► bb ► c ► d ──► e ► f ► nil
//! ```
//!
//! The head tower lives inside the list itself; `None` in a predecessor
//! position means "the head".

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::iter::{Entries, Iter};

/// Tallest tower a node can have
pub const MAX_HEIGHT: usize = 12;

/// A node reaches level `h + 1` with probability `1 / BRANCHING`
pub const BRANCHING: u32 = 4;

/// Seed used by [`SkipList::new`]
pub const DEFAULT_SEED: u64 = 0xdead_beef;

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// `next[0]` is the lowest level link. Length is the node height.
    next: Box<[AtomicPtr<Node<K, V>>]>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, height: usize) -> Box<Self> {
        let next = (0..height)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();
        Box::new(Self { key, value, next })
    }

    pub(crate) fn height(&self) -> usize {
        self.next.len()
    }
}

/// Payload handed back by a rejected insert
#[derive(Debug)]
pub struct Rejected<K, V> {
    /// Key that collided with an existing entry
    pub key: K,
    /// Value that was never linked
    pub value: V,
}

impl<K, V> Rejected<K, V> {
    /// Take the key and value back
    pub fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Borrowed view of a linked node
pub struct NodeRef<'a, K, V> {
    node: &'a Node<K, V>,
    owner: u64,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(node: &'a Node<K, V>, owner: u64) -> Self {
        Self { node, owner }
    }

    /// Key stored in the node
    pub fn key(&self) -> &'a K {
        &self.node.key
    }

    /// Payload stored in the node
    pub fn value(&self) -> &'a V {
        &self.node.value
    }

    /// Number of levels the node is linked on
    pub fn height(&self) -> usize {
        self.node.height()
    }

    /// Drop the borrow, keeping a handle that [`SkipList::resolve`] accepts
    pub fn detach(self) -> RawNode<K, V> {
        RawNode {
            ptr: NonNull::from(self.node),
            owner: self.owner,
        }
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.node.key)
            .field("value", &self.node.value)
            .field("height", &self.node.height())
            .finish()
    }
}

/// Non-owning node handle, for side indexes that outlive a single borrow
/// of the list. Only the list that produced it can turn it back into a
/// [`NodeRef`].
pub struct RawNode<K, V> {
    ptr: NonNull<Node<K, V>>,
    owner: u64,
}

impl<K, V> Clone for RawNode<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for RawNode<K, V> {}

impl<K, V> fmt::Debug for RawNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawNode")
            .field("ptr", &self.ptr)
            .field("owner", &self.owner)
            .finish()
    }
}

// SAFETY: a RawNode is only dereferenced through `SkipList::resolve`, which
// hands out `&K`/`&V` under a borrow of the owning list.
unsafe impl<K: Send + Sync, V: Send + Sync> Send for RawNode<K, V> {}
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for RawNode<K, V> {}

/// Concurrent ordered index with unique keys
///
/// Writers serialise on an internal mutex that also owns the height RNG.
/// Readers never lock: every forward pointer is read with an acquire load
/// and published with a release store, so a reader that sees a node also
/// sees its key and payload fully initialised.
pub struct SkipList<K, V> {
    head: [AtomicPtr<Node<K, V>>; MAX_HEIGHT],
    /// Modified only by `insert`. Read racily; stale values only shorten
    /// the descent.
    max_height: AtomicUsize,
    len: AtomicUsize,
    writer: Mutex<StdRng>,
    id: u64,
    _owns: PhantomData<Box<Node<K, V>>>,
}

// SAFETY: nodes are reachable only through the list; readers get `&K`/`&V`
// and the list frees nodes on drop.
unsafe impl<K: Send + Sync, V: Send + Sync> Send for SkipList<K, V> {}
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for SkipList<K, V> {}

type Predecessors<'a, K, V> = [Option<&'a Node<K, V>>; MAX_HEIGHT];

impl<K: Ord, V> SkipList<K, V> {
    /// Create an empty list seeded with [`DEFAULT_SEED`]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create an empty list whose node heights follow `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            head: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            max_height: AtomicUsize::new(1),
            len: AtomicUsize::new(0),
            writer: Mutex::new(StdRng::seed_from_u64(seed)),
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            _owns: PhantomData,
        }
    }

    /// Insert `key` with `value`
    ///
    /// # Returns
    /// * `Ok(NodeRef)` - the newly linked node
    /// * `Err(Rejected)` - an equal key is already linked; key and value
    ///   are handed back untouched
    pub fn insert(&self, key: K, value: V) -> Result<NodeRef<'_, K, V>, Rejected<K, V>> {
        let mut rng = self.writer.lock();

        let mut prev: Predecessors<'_, K, V> = [None; MAX_HEIGHT];
        let found = self.find_greater_or_equal_node(&key, Some(&mut prev));
        if found.is_some_and(|n| n.key == key) {
            return Err(Rejected { key, value });
        }

        let height = random_height(&mut rng);
        let max_height = self.max_height();
        if height > max_height {
            // prev[max_height..height] are still None, i.e. the head. A
            // reader that sees the new height before the links below just
            // finds nil at the top levels and drops down.
            self.max_height.store(height, Ordering::Relaxed);
        }

        let node = Box::into_raw(Node::new(key, value, height));
        // SAFETY: freshly allocated, not yet visible to any reader.
        let node_ref = unsafe { &*node };
        for (level, pred) in prev.iter().enumerate().take(height) {
            let link = &self.tower(*pred)[level];
            // Relaxed is enough here: the release store into the
            // predecessor publishes this write along with the node.
            node_ref.next[level].store(link.load(Ordering::Relaxed), Ordering::Relaxed);
            link.store(node, Ordering::Release);
        }

        self.len.fetch_add(1, Ordering::Relaxed);
        Ok(NodeRef::new(node_ref, self.id))
    }

    /// Returns true iff an entry equal to `key` is linked
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Node whose key equals `key`
    pub fn get<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_greater_or_equal_node(key, None)
            .filter(|n| n.key.borrow() == key)
            .map(|n| NodeRef::new(n, self.id))
    }

    /// Earliest node with a key `>= key`
    pub fn find_greater_or_equal<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_greater_or_equal_node(key, None)
            .map(|n| NodeRef::new(n, self.id))
    }

    /// Latest node with a key `< key`, `None` if there is none
    pub fn find_less_than<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_less_than_node(key).map(|n| NodeRef::new(n, self.id))
    }

    /// Last node in the list, `None` if empty
    pub fn find_last(&self) -> Option<NodeRef<'_, K, V>> {
        self.find_last_node().map(|n| NodeRef::new(n, self.id))
    }

    /// Cursor over the list. Not positioned until a seek.
    pub fn cursor(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Ascending iterator from the first entry
    pub fn iter(&self) -> Entries<'_, K, V> {
        Entries::new(self, self.next_of(None, 0))
    }

    /// Ascending iterator from the first entry `>= start`
    pub fn range_from<Q>(&self, start: &Q) -> Entries<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Entries::new(self, self.find_greater_or_equal_node(start, None))
    }

    pub(crate) fn find_greater_or_equal_node<'a, Q>(
        &'a self,
        key: &Q,
        mut prev: Option<&mut Predecessors<'a, K, V>>,
    ) -> Option<&'a Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = None;
        let mut level = self.max_height() - 1;
        loop {
            let next = self.next_of(x, level);
            match next {
                Some(n) if n.key.borrow() < key => x = next,
                _ => {
                    if let Some(prev) = prev.as_mut() {
                        prev[level] = x;
                    }
                    if level == 0 {
                        return next;
                    }
                    level -= 1;
                }
            }
        }
    }

    pub(crate) fn find_less_than_node<'a, Q>(&'a self, key: &Q) -> Option<&'a Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = None;
        let mut level = self.max_height() - 1;
        loop {
            match self.next_of(x, level) {
                Some(n) if n.key.borrow() < key => x = Some(n),
                _ => {
                    if level == 0 {
                        return x;
                    }
                    level -= 1;
                }
            }
        }
    }

    pub(crate) fn find_last_node(&self) -> Option<&Node<K, V>> {
        let mut x = None;
        let mut level = self.max_height() - 1;
        loop {
            match self.next_of(x, level) {
                Some(n) => x = Some(n),
                None => {
                    if level == 0 {
                        return x;
                    }
                    level -= 1;
                }
            }
        }
    }
}

impl<K, V> SkipList<K, V> {
    /// Number of linked entries
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height of the tallest tower linked so far (at least 1)
    pub fn max_height(&self) -> usize {
        self.max_height.load(Ordering::Relaxed)
    }

    /// Re-borrow a handle produced by this list
    ///
    /// Returns `None` for handles that came from a different list.
    pub fn resolve(&self, raw: RawNode<K, V>) -> Option<NodeRef<'_, K, V>> {
        if raw.owner != self.id {
            return None;
        }
        // SAFETY: the handle was detached from a node of this list, and
        // nodes live until the list drops, which `&self` rules out.
        let node = unsafe { raw.ptr.as_ref() };
        Some(NodeRef::new(node, self.id))
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    fn tower<'a>(&'a self, x: Option<&'a Node<K, V>>) -> &'a [AtomicPtr<Node<K, V>>] {
        match x {
            Some(node) => &node.next,
            None => &self.head,
        }
    }

    /// Successor of `x` (or of the head) at `level`
    pub(crate) fn next_of<'a>(
        &'a self,
        x: Option<&'a Node<K, V>>,
        level: usize,
    ) -> Option<&'a Node<K, V>> {
        let ptr = self.tower(x)[level].load(Ordering::Acquire);
        // SAFETY: non-null pointers in a tower always point to nodes owned
        // by this list, published by a release store after initialisation.
        unsafe { ptr.as_ref() }
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SkipList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipList")
            .field("len", &self.len())
            .field("max_height", &self.max_height())
            .finish()
    }
}

impl<K, V> Drop for SkipList<K, V> {
    fn drop(&mut self) {
        let mut cur = *self.head[0].get_mut();
        while !cur.is_null() {
            // SAFETY: every node is linked on level 0 exactly once, and
            // `&mut self` means no reader is left.
            let node = unsafe { Box::from_raw(cur) };
            cur = node.next[0].load(Ordering::Relaxed);
        }
    }
}

fn random_height(rng: &mut StdRng) -> usize {
    let mut height = 1;
    while height < MAX_HEIGHT && rng.gen_ratio(1, BRANCHING) {
        height += 1;
    }
    height
}
