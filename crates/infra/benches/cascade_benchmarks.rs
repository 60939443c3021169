use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use flatshare_core::{Collection, UserId};
use flatshare_infra::cascade::CascadeEngine;
use flatshare_infra::config::CascadeConfig;
use flatshare_infra::store::InMemoryDocumentStore;
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Runtime;

const FLATS: usize = 10;

/// One target user owning `FLATS` flats, with `messages` messages spread
/// across those flats (half sent by the target, half by someone else).
fn populated_store(messages: usize) -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    store
        .insert_raw(Collection::Users, "target", json!({ "id": "target" }))
        .unwrap();
    for f in 0..FLATS {
        let id = format!("f{f}");
        store
            .insert_raw(Collection::Flats, id.clone(), json!({ "id": id, "ownerID": "target" }))
            .unwrap();
    }
    for m in 0..messages {
        let id = format!("m{m}");
        let sender = if m % 2 == 0 { "target" } else { "other" };
        store
            .insert_raw(
                Collection::Messages,
                id.clone(),
                json!({ "id": id, "senderId": sender, "flatID": format!("f{}", m % FLATS) }),
            )
            .unwrap();
    }
    store
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn bench_resolve(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("resolve");

    for messages in [10usize, 100, 1_000] {
        let engine = CascadeEngine::new(populated_store(messages));
        let user = UserId::new("target");
        group.throughput(Throughput::Elements(messages as u64));
        group.bench_with_input(BenchmarkId::from_parameter(messages), &messages, |b, _| {
            b.iter(|| rt.block_on(engine.resolve(black_box(&user))).unwrap());
        });
    }

    group.finish();
}

fn bench_remove_user_cascade(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("remove_user_cascade");

    for messages in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements((messages + FLATS + 1) as u64));

        group.bench_with_input(BenchmarkId::new("unbounded", messages), &messages, |b, &n| {
            b.iter_batched(
                || CascadeEngine::new(populated_store(n)),
                |engine| rt.block_on(engine.remove_user_cascade(&UserId::new("target"))),
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("max_in_flight_16", messages), &messages, |b, &n| {
            b.iter_batched(
                || {
                    CascadeEngine::new(populated_store(n))
                        .with_config(CascadeConfig::default().with_max_concurrent_deletes(16))
                },
                |engine| rt.block_on(engine.remove_user_cascade(&UserId::new("target"))),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_remove_user_cascade);
criterion_main!(benches);
