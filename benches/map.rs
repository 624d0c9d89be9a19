use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use once_cell::sync::Lazy;
use rand::Rng;

use ctrlmap::CtrlMap;

const TOTAL_KEYS: u64 = 10_000;

static RANDOM_KEYS: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut rng = rand::thread_rng();
    let mut keys: Vec<u64> = (0..TOTAL_KEYS).collect();
    for i in (1..keys.len()).rev() {
        let j = rng.gen_range(0..=i);
        keys.swap(i, j);
    }
    keys
});

fn insert_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_sequential");
    group.throughput(Throughput::Elements(TOTAL_KEYS));
    group.bench_function(BenchmarkId::new("ctrlmap", TOTAL_KEYS), |b| {
        b.iter(|| {
            let mut map: CtrlMap<u64, u64> = CtrlMap::new();
            for i in 0..TOTAL_KEYS {
                map.put(i, i).unwrap();
            }
            map
        })
    });
    group.bench_function(BenchmarkId::new("std::HashMap", TOTAL_KEYS), |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for i in 0..TOTAL_KEYS {
                map.insert(i, i);
            }
            map
        })
    });
    group.finish();
}

fn insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    group.throughput(Throughput::Elements(TOTAL_KEYS));
    group.bench_function(BenchmarkId::new("ctrlmap", TOTAL_KEYS), |b| {
        b.iter(|| {
            let mut map: CtrlMap<u64, u64> = CtrlMap::new();
            for &k in RANDOM_KEYS.iter() {
                map.put(k, k).unwrap();
            }
            map
        })
    });
    group.bench_function(BenchmarkId::new("std::HashMap", TOTAL_KEYS), |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for &k in RANDOM_KEYS.iter() {
                map.insert(k, k);
            }
            map
        })
    });
    group.finish();
}

fn get_hit(c: &mut Criterion) {
    let mut ctrl: CtrlMap<u64, u64> = CtrlMap::with_capacity(TOTAL_KEYS as usize);
    let mut std_map = HashMap::with_capacity(TOTAL_KEYS as usize);
    for &k in RANDOM_KEYS.iter() {
        ctrl.put(k, k).unwrap();
        std_map.insert(k, k);
    }

    let mut group = c.benchmark_group("get_hit");
    group.throughput(Throughput::Elements(TOTAL_KEYS));
    group.bench_function(BenchmarkId::new("ctrlmap", TOTAL_KEYS), |b| {
        b.iter(|| {
            for &k in RANDOM_KEYS.iter() {
                criterion::black_box(ctrl.get(&k));
            }
        })
    });
    group.bench_function(BenchmarkId::new("std::HashMap", TOTAL_KEYS), |b| {
        b.iter(|| {
            for &k in RANDOM_KEYS.iter() {
                criterion::black_box(std_map.get(&k));
            }
        })
    });
    group.finish();
}

fn remove_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_all");
    group.throughput(Throughput::Elements(TOTAL_KEYS));
    group.bench_function(BenchmarkId::new("ctrlmap", TOTAL_KEYS), |b| {
        b.iter_batched(
            || {
                let mut map: CtrlMap<u64, u64> = CtrlMap::with_capacity(TOTAL_KEYS as usize);
                for &k in RANDOM_KEYS.iter() {
                    map.put(k, k).unwrap();
                }
                map
            },
            |mut map| {
                for &k in RANDOM_KEYS.iter() {
                    criterion::black_box(map.remove(&k));
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, insert_sequential, insert_random, get_hit, remove_all);
criterion_main!(benches);
