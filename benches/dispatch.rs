use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use weft::{ChainBuilder, Registry, Verdict, handler_fn};

// Measures the composition layer itself: chain construction from the
// registry, and a full worst-case traversal (no link accepts).

fn registry_with_thresholds(limits: &[u32]) -> Registry<u32> {
    let registry = Registry::new();
    for (i, limit) in limits.iter().copied().enumerate() {
        registry.register(format!("link{i}"), move || {
            Ok(Box::new(handler_fn(move |req: &mut u32| {
                if *req <= limit { Verdict::Accept } else { Verdict::Pass }
            })) as _)
        });
    }
    registry
}

fn chain_build_benchmark(c: &mut Criterion) {
    let registry = registry_with_thresholds(&[3, 7, 10, 20, 50, 100, 200, 500]);
    let keys = registry.snapshot();

    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("chain_8_links", |b| {
        let builder = ChainBuilder::new(&registry);
        b.iter(|| builder.build(&keys).unwrap())
    });
    group.finish();
}

fn chain_dispatch_benchmark(c: &mut Criterion) {
    let registry = registry_with_thresholds(&[3, 7, 10, 20, 50, 100, 200, 500]);
    let chain = ChainBuilder::new(&registry)
        .build(&registry.snapshot())
        .unwrap();

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));
    group.bench_function("worst_case_traversal", |b| {
        b.iter(|| chain.dispatch(&mut 1000))
    });
    group.bench_function("head_acceptance", |b| b.iter(|| chain.dispatch(&mut 1)));
    group.finish();
}

criterion_group!(benches, chain_build_benchmark, chain_dispatch_benchmark);
criterion_main!(benches);
