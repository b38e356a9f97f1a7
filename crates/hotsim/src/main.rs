//! HotCache workload driver
//!
//! Feeds a synthetic compaction stream and a live-write stream through a
//! cache, with optional concurrent scanners, then reports usage.

mod workload;

use anyhow::{ensure, Result};
use clap::Parser;
use hotcache::{CacheConfig, HotCache};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};

use crate::workload::Workload;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Entries produced by the compaction stream
    #[arg(short, long, default_value_t = 100_000)]
    entries: usize,

    /// Live writes to replay after compaction
    #[arg(short, long, default_value_t = 200_000)]
    writes: usize,

    /// Fraction of live writes that target a cached key
    #[arg(long, default_value_t = 0.8)]
    hit_fraction: f64,

    /// Fraction of live writes that are deletions
    #[arg(long, default_value_t = 0.05)]
    delete_fraction: f64,

    /// Average value size in bytes
    #[arg(long, default_value_t = 100)]
    value_size: usize,

    /// Seed for the workload and skip list heights
    #[arg(short, long, default_value_t = default_seed())]
    seed: u64,

    /// Scanner threads running during the live writes
    #[arg(short, long, default_value_t = 2)]
    threads: usize,
}

fn default_seed() -> u64 {
    CacheConfig::default().seed
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    ensure!(
        (0.0..=1.0).contains(&args.hit_fraction),
        "--hit-fraction must be within [0, 1], got {}",
        args.hit_fraction
    );
    ensure!(
        (0.0..=1.0).contains(&args.delete_fraction),
        "--delete-fraction must be within [0, 1], got {}",
        args.delete_fraction
    );

    info!("Starting hotsim v{}", env!("CARGO_PKG_VERSION"));
    info!("Compaction entries: {}", args.entries);
    info!("Live writes: {}", args.writes);
    info!("Scanner threads: {}", args.threads);

    let config = CacheConfig::new()
        .with_seed(args.seed)
        .with_expected_entries(args.entries);
    let cache = HotCache::with_config(config);
    let mut workload = Workload::new(
        args.seed,
        args.entries,
        args.value_size,
        args.hit_fraction,
        args.delete_fraction,
    );

    let started = Instant::now();
    let ingested = workload.run_compaction(&cache)?;
    info!(
        "Ingested {} entries in {:.2?} ({} duplicates)",
        ingested,
        started.elapsed(),
        cache.stats().duplicates()
    );

    let done = AtomicBool::new(false);
    let started = Instant::now();
    let absorbed = std::thread::scope(|s| -> Result<usize> {
        for id in 0..args.threads {
            let cache = &cache;
            let done = &done;
            s.spawn(move || {
                let mut scans = 0u64;
                while !done.load(Ordering::Acquire) {
                    let live = cache.scan().filter(|(_, e)| !e.is_deleted()).count();
                    scans += 1;
                    debug!("Scanner {} pass {}: {} live entries", id, scans, live);
                }
                debug!("Scanner {} finished after {} passes", id, scans);
            });
        }

        let result = workload.run_live_writes(&cache, args.writes);
        done.store(true, Ordering::Release);
        Ok(result?)
    })?;
    info!(
        "Replayed {} writes in {:.2?}, {} absorbed",
        args.writes,
        started.elapsed(),
        absorbed
    );

    cache.log_report();
    println!("{}", cache.report());

    Ok(())
}
