use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use scribe_ot::{Model, Transform};
use scribed::binder::{Binder, BinderContext};
use scribed::store::MemoryStore;
use scribed::BinderConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const RETENTION: Duration = Duration::from_secs(60);

// Pushes that each miss `lag` earlier transforms, so every push pays for a rebase.
fn push_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_push");
    group.throughput(Throughput::Elements(1));

    for lag in [0u64, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(lag), &lag, |b, &lag| {
            let mut model = Model::new("bench");
            for _ in 0..lag {
                model
                    .push(Transform::new(0, 0, "x", model.version() + 1))
                    .unwrap();
            }
            b.iter(|| {
                let version = model.version() + 1 - lag;
                model.push(Transform::new(0, 0, "y", version)).unwrap()
            })
        });
    }

    group.finish();
}

fn flush_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_flush");
    let batch = 256;
    group.throughput(Throughput::Elements(batch));

    group.bench_function("flush_256_inserts", |b| {
        b.iter_batched(
            || {
                let mut model = Model::new("bench");
                let mut content = "lorem ipsum dolor sit amet ".repeat(64);
                model.flush(&mut content, RETENTION).unwrap();
                for i in 0..batch {
                    let version = model.version() + 1;
                    model
                        .push(Transform::new(i as i64, 0, "z", version))
                        .unwrap();
                }
                (model, content)
            },
            |(mut model, mut content)| model.flush(&mut content, RETENTION).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn binder_submit_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("binder");
    group.throughput(Throughput::Elements(1));

    let handle = runtime.block_on(async {
        let store = Arc::new(MemoryStore::mock("bench", ""));
        let (ctx, _exits) = BinderContext::new(BinderConfig::default(), store);
        Binder::bind_existing("bench", 1, &ctx).await.unwrap()
    });

    let next = AtomicU64::new(2);
    group.bench_function("submit_no_subscribers", |b| {
        let (handle, next) = (&handle, &next);
        b.to_async(&runtime).iter(|| async move {
            let version = next.load(Ordering::Relaxed);
            let accepted = handle.submit(Transform::new(0, 0, "a", version)).await.unwrap();
            next.store(accepted + 1, Ordering::Relaxed);
        })
    });

    group.finish();
    runtime.block_on(handle.close());
}

criterion_group!(benches, push_benchmark, flush_benchmark, binder_submit_benchmark);
criterion_main!(benches);
