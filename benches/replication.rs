use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mm1sim::prelude::*;
use mm1sim::run_replication;

fn bench_replication(c: &mut Criterion) {
    c.bench_function("replication_1500_customers", |b| {
        let mut index = 0u64;
        b.iter(|| {
            let mut streams = Streams::for_replication(7, index);
            index += 1;
            run_replication(black_box(3.0), black_box(4.0), 1500, &mut streams)
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    group.sample_size(10);
    for replications in [30usize, 100, 1000] {
        group.bench_function(format!("n{replications}"), |b| {
            b.iter(|| aggregate_seeded(3.0, 4.0, 500.0, black_box(replications), 7))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_replication, bench_aggregate);
criterion_main!(benches);
