//! # hotskip
//!
//! Ordered index for the hot entry cache.
//!
//! ## Architecture
//! - **Nodes**: heap allocated, never unlinked or freed before the list drops
//! - **Towers**: per-node forward pointers, height drawn with branching factor 4
//! - **Publication**: release stores on insert, acquire loads on every read
//!
//! ## Thread safety
//! - One writer at a time (inserts serialise on an internal mutex)
//! - Unlimited lock-free readers (`contains`, `get`, cursors, find operations)
//! - Payloads are shared as `&V`; a payload that mutates after publication
//!   must carry its own synchronisation

#![warn(missing_docs)]

mod iter;
mod skiplist;

pub use iter::{Entries, Iter};
pub use skiplist::{NodeRef, RawNode, Rejected, SkipList, BRANCHING, DEFAULT_SEED, MAX_HEIGHT};

#[cfg(test)]
mod proptests;
