use std::collections::BTreeSet;

use hotcache::{append_internal_key, CacheConfig, HotCache, Ingest, Tag, ValueType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn ikey(user_key: &[u8], sequence: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    append_internal_key(&mut buf, user_key, sequence, ValueType::Value).unwrap();
    buf
}

fn random_keys(rng: &mut StdRng, count: usize) -> BTreeSet<Vec<u8>> {
    let mut keys = BTreeSet::new();
    while keys.len() < count {
        let len = rng.gen_range(1..24);
        keys.insert((0..len).map(|_| rng.gen()).collect());
    }
    keys
}

#[test]
fn fruit_scenario() {
    let cache = HotCache::new();
    cache.ingest_from_compaction(&ikey(b"apple", 0), b"red").unwrap();
    cache.ingest_from_compaction(&ikey(b"banana", 1), b"yellow").unwrap();

    let keys: Vec<&[u8]> = cache.scan().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![&b"apple"[..], &b"banana"[..]]);

    assert!(cache.apply_if_present(5, ValueType::Value, b"apple", b"green").unwrap());
    let apple = cache.get(b"apple").unwrap();
    assert_eq!(apple.value, Some(b"green".to_vec()));
    assert_eq!(apple.tag, Tag::pack(5, ValueType::Value).unwrap());

    let bytes = cache.stats().bytes();
    assert!(!cache.apply_if_present(6, ValueType::Value, b"cherry", b"x").unwrap());
    assert_eq!(cache.stats().bytes(), bytes);
    assert!(cache.get(b"cherry").is_none());
}

#[test]
fn ten_thousand_seeded_keys() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut all = random_keys(&mut rng, 20_000).into_iter().collect::<Vec<_>>();
    // Split deterministically into inserted and absent halves.
    let absent: Vec<Vec<u8>> = all.iter().skip(1).step_by(2).cloned().collect();
    all = all.into_iter().step_by(2).collect();

    let cache = HotCache::with_config(CacheConfig::new().with_seed(17).with_expected_entries(10_000));
    for (seq, k) in all.iter().enumerate() {
        let outcome = cache.ingest_from_compaction(&ikey(k, seq as u64), b"v").unwrap();
        assert_eq!(outcome, Ingest::Inserted);
        assert!(cache.contains(k));
    }

    assert_eq!(cache.len(), 10_000);
    assert!(all.iter().all(|k| cache.contains(k)));
    assert!(absent.iter().all(|k| !cache.contains(k)));

    let scanned: Vec<Vec<u8>> = cache.scan().map(|(k, _)| k.to_vec()).collect();
    assert_eq!(scanned, all);
}

#[test]
fn duplicate_ingest_changes_nothing() {
    let cache = HotCache::new();
    for k in [&b"a"[..], &b"b"[..], &b"c"[..]] {
        cache.ingest_from_compaction(&ikey(k, 1), b"value").unwrap();
    }
    let bytes = cache.stats().bytes();

    for k in [&b"a"[..], &b"b"[..], &b"c"[..]] {
        let outcome = cache.ingest_from_compaction(&ikey(k, 9), b"other value").unwrap();
        assert_eq!(outcome, Ingest::Duplicate);
    }

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.stats().bytes(), bytes);
    assert_eq!(cache.stats().inserts(), 3);
    assert_eq!(cache.stats().duplicates(), 3);
    assert_eq!(cache.scan().count(), 3);
}

#[test]
fn byte_accounting_follows_value_sizes() {
    let mut rng = StdRng::seed_from_u64(3);
    let cache = HotCache::new();
    let keys: Vec<Vec<u8>> = (0..64u32).map(|i| i.to_be_bytes().to_vec()).collect();

    let mut sizes = vec![0usize; keys.len()];
    for (i, k) in keys.iter().enumerate() {
        sizes[i] = rng.gen_range(0..32);
        cache.ingest_from_compaction(&ikey(k, 1), &vec![1u8; sizes[i]]).unwrap();
    }

    for seq in 2..2_000u64 {
        let i = rng.gen_range(0..keys.len());
        let before = cache.stats().bytes();
        let new_len = rng.gen_range(0..32);

        cache
            .apply_if_present(seq, ValueType::Value, &keys[i], &vec![2u8; new_len])
            .unwrap();

        let expected = before as i64 + new_len as i64 - sizes[i] as i64;
        assert_eq!(cache.stats().bytes() as i64, expected);
        sizes[i] = new_len;
    }

    let expected_total: usize = keys.iter().zip(&sizes).map(|(k, s)| k.len() + s + 8).sum();
    assert_eq!(cache.stats().bytes(), expected_total as u64);
}

#[test]
fn hit_ratio_is_exact() {
    let cache = HotCache::new();
    assert_eq!(cache.report().hit_ratio(), None);
    assert!(cache.report().to_string().contains("n/a"));

    cache.ingest_from_compaction(&ikey(b"hot", 1), b"v").unwrap();
    for seq in 0..7 {
        cache.apply_if_present(seq + 2, ValueType::Value, b"hot", b"w").unwrap();
    }
    for seq in 0..3 {
        cache.apply_if_present(seq + 20, ValueType::Value, b"cold", b"w").unwrap();
    }

    let report = cache.report();
    assert_eq!(report.hits, 7);
    assert_eq!(report.lookups, 10);
    assert_eq!(report.hit_ratio(), Some(7.0 / 10.0));
    assert!(report.to_string().ends_with("Hit Ratio: 0.700 (7/10)"));
}

#[test]
fn delete_keeps_key_discoverable() {
    let cache = HotCache::new();
    cache.ingest_from_compaction(&ikey(b"gone", 1), b"soon").unwrap();

    assert!(cache.apply_if_present(2, ValueType::Deletion, b"gone", b"").unwrap());

    let entry = cache.get(b"gone").unwrap();
    assert!(entry.is_deleted());
    assert_eq!(entry.tag.sequence(), 2);
    assert!(cache.contains(b"gone"));
    let scanned: Vec<_> = cache.scan().collect();
    assert_eq!(scanned.len(), 1);
    assert!(scanned[0].1.is_deleted());
}
