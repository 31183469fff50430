use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hitlru::HitCache;

fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{i}")).collect()
}

fn bench_promote(c: &mut Criterion) {
    let mut group = c.benchmark_group("promote");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("promote_resident", |b| {
        let cache = HitCache::new(200).unwrap();
        let keys = keys(100);
        for key in &keys {
            cache.insert(key.clone(), vec![b'x'; 64]);
        }

        let mut counter = 0;
        b.iter(|| {
            black_box(cache.promote(keys[counter % 100].as_str()));
            counter += 1;
        });
    });

    group.bench_function("get_resident", |b| {
        let cache = HitCache::new(200).unwrap();
        let keys = keys(100);
        for key in &keys {
            cache.insert(key.clone(), vec![b'x'; 64]);
        }

        let mut counter = 0;
        b.iter(|| {
            black_box(cache.get(keys[counter % 100].as_str()));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_insert_evicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_with_eviction", |b| {
        // Small cache, so every insert past the first few evicts
        let cache = HitCache::new(16).unwrap();
        let keys = keys(1000);

        let mut counter = 0;
        b.iter(|| {
            black_box(cache.insert(keys[counter % 1000].clone(), counter));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_promote_50_insert", |b| {
        let cache = HitCache::new(128).unwrap();
        let keys = keys(256);

        let mut counter = 0usize;
        b.iter(|| {
            let key = &keys[counter % 256];
            if counter % 2 == 0 {
                black_box(cache.promote(key.as_str()));
            } else {
                black_box(cache.insert(key.clone(), counter));
            }
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_promote,
    bench_insert_evicting,
    bench_mixed_50_50
);
criterion_main!(benches);
