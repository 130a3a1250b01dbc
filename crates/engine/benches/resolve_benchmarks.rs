//! Path resolution benchmarks
//!
//! Compares identifier lookups in a large collection with the identifier
//! index enabled and disabled, plus the POST path that extends the index.

use cantrip_core::{json, StorePath, Value};
use cantrip_engine::{DataStore, QueryOptions, StoreConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::atomic::{AtomicU64, Ordering};

const MEMBERS: usize = 10_000;

fn populated(index_identifiers: bool) -> DataStore {
    let members: Vec<Value> = (0..MEMBERS)
        .map(|i| json!({"_id": format!("member-{}", i), "n": i}))
        .collect();
    let config = StoreConfig::default().with_index_identifiers(index_identifiers);
    DataStore::from_document(config, json!({ "items": members })).unwrap()
}

fn bench_identifier_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/identifier");
    group.throughput(Throughput::Elements(1));

    for indexed in [true, false] {
        let store = populated(indexed);
        let paths: Vec<StorePath> = (0..100)
            .map(|i| StorePath::parse(&format!("/items/member-{}/n", MEMBERS - 1 - i)).unwrap())
            .collect();
        let counter = AtomicU64::new(0);
        let label = if indexed { "indexed" } else { "scan" };

        group.bench_with_input(BenchmarkId::from_parameter(label), &paths, |b, paths| {
            b.iter(|| {
                let i = counter.fetch_add(1, Ordering::Relaxed) as usize % paths.len();
                store.node(&paths[i]).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_ordinal_lookup(c: &mut Criterion) {
    let store = populated(true);
    let path = StorePath::parse(&format!("/items/{}/n", MEMBERS / 2)).unwrap();

    let mut group = c.benchmark_group("resolve/ordinal");
    group.throughput(Throughput::Elements(1));
    group.bench_function("middle", |b| b.iter(|| store.node(&path).unwrap()));
    group.finish();
}

fn bench_get_with_query(c: &mut Criterion) {
    let store = populated(true);
    let path = StorePath::parse("/items").unwrap();
    let mut params = std::collections::BTreeMap::new();
    params.insert("orderby".to_string(), "-n".to_string());
    params.insert("limit".to_string(), "20".to_string());
    let options = QueryOptions::from_params(&params).unwrap();

    let mut group = c.benchmark_group("query");
    group.sample_size(20);
    group.bench_function("orderby_limit", |b| {
        b.iter(|| store.get(&path, &options).unwrap())
    });
    group.finish();
}

fn bench_post(c: &mut Criterion) {
    let store = populated(true);
    let path = StorePath::parse("/items").unwrap();

    let mut group = c.benchmark_group("mutation");
    group.throughput(Throughput::Elements(1));
    group.bench_function("post", |b| {
        b.iter(|| store.post(&path, json!({"name": "bench"})).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_identifier_lookup,
    bench_ordinal_lookup,
    bench_get_with_query,
    bench_post
);
criterion_main!(benches);
