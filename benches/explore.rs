//! State-space exploration benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench explore
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fvm_rs::compile::program_graph_from_str;
use fvm_rs::eval::Evaluators;
use fvm_rs::interleave::interleave_pg;
use fvm_rs::semantics::transition_system_from_program_graph;

/// A process counting `var` up to `n`.
fn counter(var: &str, n: usize) -> String {
    format!("do :: {var} < {n} -> {var} := {var} + 1 od")
}

fn bench_counters(c: &mut Criterion) {
    let mut group = c.benchmark_group("interleaved_counters");
    let evaluators = Evaluators::nano_promela();
    for n in [4, 8, 16, 32] {
        let p1 = program_graph_from_str(&counter("x", n)).unwrap();
        let p2 = program_graph_from_str(&counter("y", n)).unwrap();
        let pg = interleave_pg(&p1, &p2).unwrap();
        group.throughput(Throughput::Elements(((n + 2) * (n + 2)) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &pg, |b, pg| {
            b.iter(|| transition_system_from_program_graph(pg, &evaluators).unwrap())
        });
    }
    group.finish();
}

fn bench_peterson(c: &mut Criterion) {
    let code = |me: u32, other: u32| {
        format!(
            "crit{me} := 0;
            do :: true -> skip;
                atomic{{b{me} := 1; x := {other}}};
                wait{me} := 1;
                if :: b{other} == 0 || x == {me} -> skip fi;
                wait{me} := 0;
                crit{me} := 1;
                crit{me} := 0;
                b{me} := 0
            od"
        )
    };
    let p1 = program_graph_from_str(&code(1, 2)).unwrap();
    let p2 = program_graph_from_str(&code(2, 1)).unwrap();
    let pg = interleave_pg(&p1, &p2).unwrap();
    let evaluators = Evaluators::nano_promela();
    c.bench_function("peterson", |b| {
        b.iter(|| transition_system_from_program_graph(&pg, &evaluators).unwrap())
    });
}

criterion_group!(benches, bench_counters, bench_peterson);
criterion_main!(benches);
