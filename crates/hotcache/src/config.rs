//! Cache construction options

use hotskip::DEFAULT_SEED;

/// Options for [`crate::HotCache::with_config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Seed for skip list node heights
    pub seed: u64,
    /// Keys to pre-size the point lookup index for
    pub expected_entries: usize,
}

impl CacheConfig {
    /// Default options
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_SEED,
            expected_entries: 0,
        }
    }

    /// Set the node height seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Pre-size the point lookup index
    pub fn with_expected_entries(mut self, expected_entries: usize) -> Self {
        self.expected_entries = expected_entries;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}
