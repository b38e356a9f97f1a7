//! Synthetic compaction and write streams

use hotcache::{append_internal_key, HotCache, Ingest, Result, SequenceNumber, ValueType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Seeded generator for both streams
pub struct Workload {
    rng: StdRng,
    entries: usize,
    value_size: usize,
    hit_fraction: f64,
    delete_fraction: f64,
    next_sequence: SequenceNumber,
}

impl Workload {
    pub fn new(
        seed: u64,
        entries: usize,
        value_size: usize,
        hit_fraction: f64,
        delete_fraction: f64,
    ) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            entries,
            value_size,
            hit_fraction,
            delete_fraction,
            next_sequence: 1,
        }
    }

    /// Feed `entries` ascending keys, as one compaction output would
    pub fn run_compaction(&mut self, cache: &HotCache) -> Result<usize> {
        let mut ikey = Vec::new();
        let mut inserted = 0;
        let report_every = (self.entries / 10).max(1);

        for i in 0..self.entries {
            ikey.clear();
            let sequence = self.sequence();
            append_internal_key(&mut ikey, &user_key(i), sequence, ValueType::Value)?;
            let value = self.value();
            if cache.ingest_from_compaction(&ikey, &value)? == Ingest::Inserted {
                inserted += 1;
            }
            if (i + 1) % report_every == 0 {
                info!("Compaction progress: {}/{}", i + 1, self.entries);
            }
        }

        Ok(inserted)
    }

    /// Replay `count` puts and deletes, returning how many the cache absorbed
    pub fn run_live_writes(&mut self, cache: &HotCache, count: usize) -> Result<usize> {
        let mut absorbed = 0;

        for _ in 0..count {
            let key = if self.entries > 0 && self.rng.gen_bool(self.hit_fraction) {
                user_key(self.rng.gen_range(0..self.entries))
            } else {
                // Past the compacted range, never cached.
                user_key(self.entries + self.rng.gen_range(0..self.entries.max(1)))
            };
            let kind = if self.rng.gen_bool(self.delete_fraction) {
                ValueType::Deletion
            } else {
                ValueType::Value
            };
            let value = match kind {
                ValueType::Deletion => Vec::new(),
                ValueType::Value => self.value(),
            };

            let sequence = self.sequence();
            if cache.apply_if_present(sequence, kind, &key, &value)? {
                absorbed += 1;
            }
        }

        Ok(absorbed)
    }

    fn sequence(&mut self) -> SequenceNumber {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn value(&mut self) -> Vec<u8> {
        // Half the writes keep the average size so in-place overwrites show up.
        let len = if self.rng.gen_bool(0.5) {
            self.value_size
        } else {
            self.rng.gen_range(0..=self.value_size * 2)
        };
        let fill = self.rng.gen();
        vec![fill; len]
    }
}

fn user_key(i: usize) -> Vec<u8> {
    format!("user{:012}", i).into_bytes()
}
