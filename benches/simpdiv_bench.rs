//! Benchmarks for the simplicial subdivision solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simpdiv::games::classic;
use simpdiv::nash::start::pure_start;
use simpdiv::nash::{SimpdivConfig, SimpdivSolver};

fn matching_pennies_benchmark(c: &mut Criterion) {
    let solver = SimpdivSolver::new(classic::matching_pennies(), SimpdivConfig::default())
        .expect("default config");
    let start = pure_start(solver.game());

    c.bench_function("matching_pennies_solve", |b| {
        b.iter(|| solver.solve(black_box(&start)).map(|r| r.stats.pivots))
    });
}

fn rock_paper_scissors_benchmark(c: &mut Criterion) {
    let solver = SimpdivSolver::new(classic::rock_paper_scissors(), SimpdivConfig::default())
        .expect("default config");
    let start = pure_start(solver.game());

    c.bench_function("rock_paper_scissors_solve", |b| {
        b.iter(|| solver.solve(black_box(&start)).map(|r| r.stats.pivots))
    });
}

criterion_group!(benches, matching_pennies_benchmark, rock_paper_scissors_benchmark);
criterion_main!(benches);
