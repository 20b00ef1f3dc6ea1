use std::fs;

use criterion::{criterion_group, criterion_main, Criterion};
use gridtune_core::{Param, ParamSet};
use gridtune_store::CsvStore;
use serde_json::json;
use tempfile::tempdir;

fn bench_resolve(c: &mut Criterion) {
    let root = tempdir().expect("root");
    for lr in 0..10 {
        for bs in [16, 32, 64] {
            let dir = root
                .path()
                .join(format!("--lr=0.{lr}"))
                .join(format!("--bs={bs}"));
            fs::create_dir_all(dir).expect("tree");
        }
    }
    let store = CsvStore::new(root.path());
    let config: ParamSet = vec![
        Param::new("--lr", json!("0.7")),
        Param::new("--bs", json!(32)),
    ]
    .into();
    let mut group = c.benchmark_group("resolve_scan");
    group.bench_function("populated_tree", |b| {
        b.iter(|| {
            let _ = store.resolve_dir(&config).unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
