use criterion::{criterion_group, criterion_main, Criterion};
use grid_logic_solver::constraints::Constraints;
use grid_logic_solver::context::{Arith, Context};
use grid_logic_solver::rules::PUZZLE_TYPES;
use std::hint::black_box;

fn bench_sample_puzzles(c: &mut Criterion) {
    for puzzle_type in PUZZLE_TYPES {
        let (puzzle, _) = (puzzle_type.samples[0])();
        c.bench_function(puzzle_type.name, |b| {
            b.iter(|| (puzzle_type.rule)(black_box(&puzzle), None));
        });
    }
}

fn bench_pigeonhole(c: &mut Criterion) {
    c.bench_function("pigeonhole 7 in 6", |b| {
        b.iter(|| {
            let ctx = Context::new();
            let cs = Constraints::new(&ctx);
            let vars: Vec<Arith> = (0..7).map(|_| cs.int(0, 5)).collect();
            cs.add(ctx.distinct(vars));
            black_box(cs.solve_blocking(None).no_solution())
        });
    });
}

criterion_group!(benches, bench_sample_puzzles, bench_pigeonhole);
criterion_main!(benches);
