//! Search Performance Benchmarks
//!
//! Name search over an in-memory library of growing size.
//!
//! Run with: `cargo bench --bench search_performance`

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use tokio::runtime::Runtime;

use pdf_shelf_server::store::{RecordStore, SortKey, SortOrder};

/// Build a store holding `count` small records
fn populated_store(rt: &Runtime, count: usize) -> RecordStore {
    let store = RecordStore::in_memory();
    rt.block_on(async {
        let data = Bytes::from_static(b"%PDF-1.4\n%%EOF");
        for i in 0..count {
            let name = if i % 10 == 0 {
                format!("Quarterly-Report-{}.pdf", i)
            } else {
                format!("document-{}.pdf", i)
            };
            store
                .insert(data.clone(), &name, data.len() as u64)
                .await
                .unwrap();
        }
    });
    store
}

/// Benchmark substring search by name
fn bench_search_by_name(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("search_by_name");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    for count in [100, 1_000] {
        let store = populated_store(&rt, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &store, |b, store| {
            b.iter(|| {
                let results = rt.block_on(store.search_by_name(Some(black_box("report"))));
                black_box(results.unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark sorted listing
fn bench_sorted_list(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = populated_store(&rt, 1_000);

    let mut group = c.benchmark_group("sorted_list");

    group.bench_function("name_desc_1000", |b| {
        b.iter(|| {
            let records = rt.block_on(store.list(SortKey::Name, SortOrder::Desc));
            black_box(records.unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_search_by_name, bench_sorted_list);
criterion_main!(benches);
