//! Benchmarks for geocache operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geocache::{CacheConfig, GeoCache};
use serde_json::{json, Value};
use tempfile::TempDir;

fn open_bench_cache() -> (TempDir, GeoCache) {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig::builder()
        .path(temp_dir.path())
        .map_size(256 * 1024 * 1024)
        .build();
    let cache = GeoCache::open_with(config).unwrap();
    (temp_dir, cache)
}

fn cache_benchmarks(c: &mut Criterion) {
    let (_temp, cache) = open_bench_cache();
    let record = json!({
        "cc": "DE",
        "addr": "Unter den Linden 1, 10117 Berlin",
        "locality": "Berlin",
        "tst": 1445000000
    });

    let mut i = 0u64;
    c.bench_function("put_json", |b| {
        b.iter(|| {
            i += 1;
            let key = format!("u33d{:06}", i % 10_000);
            cache.put_json(&key, black_box(&record)).unwrap();
        })
    });

    cache.put_json("u33dc0", &record).unwrap();
    c.bench_function("get_json_hit", |b| {
        b.iter(|| {
            let found: Option<Value> = cache.get_json(black_box("u33dc0"));
            black_box(found)
        })
    });

    c.bench_function("get_json_miss", |b| {
        b.iter(|| {
            let found: Option<Value> = cache.get_json(black_box("zzzzzz"));
            black_box(found)
        })
    });
}

criterion_group!(benches, cache_benchmarks);
criterion_main!(benches);
