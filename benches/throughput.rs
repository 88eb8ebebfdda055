use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Duration;

use tokio::runtime::Runtime;

use flowgate::types::MAX_LIMIT;
use flowgate::{FlowConfig, FlowName, FlowRegistry};

/// Benchmark uncontended admission on a flow whose bucket never drains.
fn bench_take(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let registry = FlowRegistry::new();
    let name = FlowName::from("wide");

    rt.block_on(async {
        registry
            .create(
                name.clone(),
                FlowConfig::limited(MAX_LIMIT).with_interval(Duration::from_secs(1)),
            )
            .unwrap();
    });

    let mut group = c.benchmark_group("take");
    group.throughput(Throughput::Elements(1));

    group.bench_function("take_uncontended", |b| {
        b.iter(|| {
            rt.block_on(registry.take(&name, black_box(1))).unwrap();
        })
    });

    group.bench_function("try_take_uncontended", |b| {
        b.iter(|| {
            black_box(registry.try_take(&name, black_box(1)).unwrap());
        })
    });

    group.finish();
}

/// Benchmark the unlimited fast path.
fn bench_unlimited(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let registry = FlowRegistry::new();
    let name = FlowName::from("open");

    rt.block_on(async {
        registry.create(name.clone(), FlowConfig::unlimited()).unwrap();
    });

    let mut group = c.benchmark_group("unlimited");
    group.throughput(Throughput::Elements(1));

    group.bench_function("take_unlimited", |b| {
        b.iter(|| {
            rt.block_on(registry.take(&name, black_box(1 << 20))).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_take, bench_unlimited);
criterion_main!(benches);
