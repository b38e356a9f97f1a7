use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hotskip::SkipList;

fn key(i: u64) -> Vec<u8> {
    format!("user{:012}", i).into_bytes()
}

fn populated(n: u64) -> SkipList<Vec<u8>, u64> {
    let list = SkipList::new();
    // Stride so keys do not arrive in order.
    for i in 0..n {
        let k = (i * 7_919) % n;
        let _ = list.insert(key(k), k);
    }
    list
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.sample_size(20);

    for n in [1_000u64, 100_000] {
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(populated(n)));
        });
    }

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    let list = populated(100_000);
    let mut counter = 0u64;
    group.bench_function("hit_100k", |b| {
        b.iter(|| {
            black_box(list.contains(key(counter % 100_000).as_slice()));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(20);

    let list = populated(100_000);
    group.throughput(Throughput::Elements(100_000));
    group.bench_function("full_100k", |b| {
        b.iter(|| black_box(list.iter().count()));
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_contains, bench_scan);
criterion_main!(benches);
