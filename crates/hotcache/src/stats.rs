//! Cache statistics tracking

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const GIB: f64 = (1u64 << 30) as f64;

/// Counters for one cache instance
///
/// All counters only grow except `bytes`, which follows value resizes and
/// deletions.
#[derive(Debug, Default)]
pub struct CacheStats {
    bytes: AtomicU64,
    lookups: AtomicU64,
    hits: AtomicU64,
    inserts: AtomicU64,
    duplicates: AtomicU64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write probe
    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a write probe that found its key
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted insert charging `bytes`
    pub fn record_insert(&self, bytes: u64) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record an insert rejected as a duplicate
    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    /// Move the tracked byte count from `old` to `new` for one buffer
    pub fn resize(&self, old: u64, new: u64) {
        if new >= old {
            self.bytes.fetch_add(new - old, Ordering::Relaxed);
        } else {
            let before = self.bytes.fetch_sub(old - new, Ordering::Relaxed);
            debug_assert!(
                before >= old - new,
                "tracked bytes underflow: {} - {}",
                before,
                old - new
            );
        }
    }

    /// Get tracked bytes
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Get total write probes
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.lookups().saturating_sub(self.hits())
    }

    /// Get accepted inserts
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Get rejected duplicate inserts
    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    /// Hit ratio (0.0 to 1.0), `None` before the first lookup
    pub fn hit_ratio(&self) -> Option<f64> {
        self.report().hit_ratio()
    }

    /// Point-in-time copy of the counters
    pub fn report(&self) -> CacheReport {
        // Hits first: a concurrent probe can then only make lookups larger,
        // never leave hits > lookups.
        let hits = self.hits();
        CacheReport {
            bytes: self.bytes(),
            hits,
            lookups: self.lookups(),
        }
    }
}

/// Snapshot of cache usage for the diagnostics sink
///
/// Displays as:
/// ```text
/// Cache Size: 0.001GB
/// Hit Ratio: 0.750 (3/4)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheReport {
    /// Tracked key, tag and value bytes
    pub bytes: u64,
    /// Write probes that found their key
    pub hits: u64,
    /// All write probes
    pub lookups: u64,
}

impl CacheReport {
    /// Tracked bytes in binary gigabytes
    pub fn gigabytes(&self) -> f64 {
        self.bytes as f64 / GIB
    }

    /// `hits / lookups`, `None` when there were no lookups
    pub fn hit_ratio(&self) -> Option<f64> {
        if self.lookups == 0 {
            None
        } else {
            Some(self.hits as f64 / self.lookups as f64)
        }
    }
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache Size: {:.3}GB", self.gigabytes())?;
        match self.hit_ratio() {
            Some(ratio) => write!(f, "Hit Ratio: {:.3} ({}/{})", ratio, self.hits, self.lookups),
            None => write!(f, "Hit Ratio: n/a ({}/{})", self.hits, self.lookups),
        }
    }
}
