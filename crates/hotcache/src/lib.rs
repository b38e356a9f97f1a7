//! # hotcache
//!
//! In-memory hot entry overlay for an LSM-tree engine.
//!
//! ## Architecture
//! - **Ordered index**: `hotskip::SkipList` owning every cached key, tag and value
//! - **Point lookup index**: AHash map from key bytes to skip list nodes (O(1))
//! - **Cache manager**: fed by compaction output, absorbs later puts and deletes
//!
//! ## Concurrency
//! - Inserts serialise on the point index write lock
//! - Write probes and reads take the point index read lock, then the
//!   per-entry payload lock
//! - Ordered scans never block on inserts
//!
//! No eviction and no durability: dropping the cache only costs performance.

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod format;
mod point;
mod stats;

pub use cache::{CachedEntry, HotCache, Ingest, LiveWrite};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use format::{
    append_internal_key, parse_internal_key, ParsedInternalKey, SequenceNumber, Tag, ValueType,
    MAX_SEQUENCE_NUMBER, TAG_SIZE,
};
pub use point::PointIndex;
pub use stats::{CacheReport, CacheStats};
