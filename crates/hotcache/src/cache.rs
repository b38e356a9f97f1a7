//! HotCache: compaction-fed cache that absorbs live writes

use parking_lot::RwLock;
use tracing::{debug, info, trace};

use hotskip::SkipList;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::format::{parse_internal_key, SequenceNumber, Tag, ValueType, TAG_SIZE};
use crate::point::PointIndex;
use crate::stats::{CacheReport, CacheStats};

/// Mutable part of a cached entry
///
/// Key and links are immutable once published; tag and value change on
/// every absorbed write, so they sit behind a per-node lock.
#[derive(Debug)]
struct Payload {
    tag: Tag,
    /// `None` once deleted
    value: Option<Vec<u8>>,
}

impl Payload {
    fn snapshot(&self) -> CachedEntry {
        CachedEntry {
            tag: self.tag,
            value: self.value.clone(),
        }
    }
}

type HotTable = SkipList<Box<[u8]>, RwLock<Payload>>;
type HotIndex = PointIndex<Box<[u8]>, RwLock<Payload>>;

/// Copy of a cached entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    /// Tag of the latest write
    pub tag: Tag,
    /// Current value, `None` if the latest write was a deletion
    pub value: Option<Vec<u8>>,
}

impl CachedEntry {
    /// Check if the latest write was a deletion
    pub fn is_deleted(&self) -> bool {
        self.value.is_none()
    }
}

/// Outcome of [`HotCache::ingest_from_compaction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// Entry is now cached
    Inserted,
    /// Key was already cached; the new copy was discarded
    Duplicate,
}

/// One write from the engine's write path
#[derive(Debug, Clone, Copy)]
pub struct LiveWrite<'a> {
    /// Sequence number of the write
    pub sequence: SequenceNumber,
    /// Put or delete
    pub kind: ValueType,
    /// User key
    pub key: &'a [u8],
    /// Value, ignored for deletions
    pub value: &'a [u8],
}

/// Hot entry cache over an ordered index and a point lookup index
///
/// Entries arrive from compaction in key order and are never evicted.
/// Later writes to a cached key update it in place.
pub struct HotCache {
    /// Point lookup index. Write-locked across insert + register so a probe
    /// never misses a node that is already linked.
    index: RwLock<HotIndex>,

    /// Ordered index owning every entry
    table: HotTable,

    /// Cache statistics
    stats: CacheStats,
}

impl HotCache {
    /// Create an empty cache with default options
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create an empty cache
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            index: RwLock::new(PointIndex::with_capacity(config.expected_entries)),
            table: SkipList::with_seed(config.seed),
            stats: CacheStats::new(),
        }
    }

    /// Cache one entry from a compaction output stream
    ///
    /// # Arguments
    /// * `internal_key` - User key followed by the 8-byte tag
    /// * `value` - Value bytes, copied into the cache
    ///
    /// # Returns
    /// * `Result<Ingest>` - `Duplicate` if the user key is already cached
    pub fn ingest_from_compaction(&self, internal_key: &[u8], value: &[u8]) -> Result<Ingest> {
        let parsed = parse_internal_key(internal_key)?;
        let charge = (parsed.user_key.len() + value.len() + TAG_SIZE) as u64;

        let payload = RwLock::new(Payload {
            tag: parsed.tag,
            value: Some(value.to_vec()),
        });

        let mut index = self.index.write();
        match self.table.insert(parsed.user_key.into(), payload) {
            Ok(node) => {
                index.register(node.key(), node.detach());
                // Charge before unlocking: a probe that finds the node may
                // shrink or delete its value right away.
                self.stats.record_insert(charge);
                drop(index);
                Ok(Ingest::Inserted)
            }
            Err(rejected) => {
                drop(index);
                // The copies were never linked; release them now.
                drop(rejected);
                self.stats.record_duplicate();
                debug!(
                    "Duplicate compaction entry ignored ({} byte key, seq {})",
                    parsed.user_key.len(),
                    parsed.tag.sequence()
                );
                Ok(Ingest::Duplicate)
            }
        }
    }

    /// Apply a live write to the cached entry for `key`, if there is one
    ///
    /// # Arguments
    /// * `sequence` - Sequence number of the write
    /// * `kind` - Put or delete
    /// * `key` - User key
    /// * `value` - New value (ignored for deletions)
    ///
    /// # Returns
    /// * `Result<bool>` - true if the cache absorbed the write
    pub fn apply_if_present(
        &self,
        sequence: SequenceNumber,
        kind: ValueType,
        key: &[u8],
        value: &[u8],
    ) -> Result<bool> {
        let tag = Tag::pack(sequence, kind)?;
        self.stats.record_lookup();

        let raw = self.index.read().lookup(key);
        let Some(node) = raw.and_then(|raw| self.table.resolve(raw)) else {
            return Ok(false);
        };
        self.stats.record_hit();

        let mut guard = node.value().write();
        let payload = &mut *guard;
        payload.tag = tag;
        match kind {
            ValueType::Deletion => {
                if let Some(old) = payload.value.take() {
                    self.stats.resize(old.len() as u64, 0);
                }
            }
            ValueType::Value => match payload.value.as_mut() {
                Some(buf) if buf.len() == value.len() => buf.copy_from_slice(value),
                _ => {
                    let old_len = payload.value.as_ref().map_or(0, Vec::len);
                    payload.value = Some(value.to_vec());
                    self.stats.resize(old_len as u64, value.len() as u64);
                    debug!("Cached value resized: {} -> {} bytes", old_len, value.len());
                }
            },
        }

        trace!("Absorbed write at seq {}", sequence);
        Ok(true)
    }

    /// Apply a sequence of live writes
    ///
    /// # Returns
    /// * `Result<usize>` - number of writes the cache absorbed
    pub fn apply_batch<'a, I>(&self, writes: I) -> Result<usize>
    where
        I: IntoIterator<Item = LiveWrite<'a>>,
    {
        let mut absorbed = 0;
        for write in writes {
            if self.apply_if_present(write.sequence, write.kind, write.key, write.value)? {
                absorbed += 1;
            }
        }
        Ok(absorbed)
    }

    /// Copy of the cached entry for `key`
    ///
    /// Does not count as a lookup in the statistics.
    pub fn get(&self, key: &[u8]) -> Option<CachedEntry> {
        let raw = self.index.read().lookup(key)?;
        let node = self.table.resolve(raw)?;
        let entry = node.value().read().snapshot();
        Some(entry)
    }

    /// Check if `key` is cached (deleted entries included)
    pub fn contains(&self, key: &[u8]) -> bool {
        self.table.contains(key)
    }

    /// Cached entries in key order, starting at the first key `>= start`
    pub fn scan_from<'a>(
        &'a self,
        start: &[u8],
    ) -> impl Iterator<Item = (&'a [u8], CachedEntry)> + 'a {
        self.table
            .range_from(start)
            .map(|node| (&**node.key(), node.value().read().snapshot()))
    }

    /// All cached entries in key order
    pub fn scan(&self) -> impl Iterator<Item = (&[u8], CachedEntry)> + '_ {
        self.scan_from(&[])
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Usage and hit ratio for the diagnostics sink
    pub fn report(&self) -> CacheReport {
        self.stats.report()
    }

    /// Emit [`HotCache::report`] through `tracing`
    pub fn log_report(&self) {
        let report = self.report();
        for line in report.to_string().lines() {
            info!("{}", line);
        }
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for HotCache {
    fn default() -> Self {
        Self::new()
    }
}
