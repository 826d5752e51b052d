//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use revtape::machine::{bundled, RandomMachineConfig};
use revtape::{Solver, SolverConfig};

fn benchmark_search(c: &mut Criterion) {
    let config = SolverConfig::for_depth(64);

    // bundled machines: bounded number of decisions each
    for index in [1, 6] {
        let machine = bundled::load(index).expect("bundled machine decodes");
        c.bench_function(&format!("bundled_{}_10k_steps", index), |b| {
            b.iter(|| {
                let solver = Solver::new(&machine, config).expect("config fits");
                let mut search = solver.start().expect("search starts");
                for _ in 0..10_000 {
                    if search.is_finished() || search.step(&mut ()).is_err() {
                        break;
                    }
                }
                black_box(search.stats().candidates)
            });
        });
    }

    let generator = RandomMachineConfig {
        state_count: 10,
        symbol_count: 2,
        rule_count: 30,
        ..RandomMachineConfig::default()
    };
    let machines: Vec<_> = (0..32)
        .map(|seed| generator.generate_seeded(seed).expect("generator accepts config"))
        .collect();
    c.bench_function("small_random_depth_10", |b| {
        b.iter(|| {
            for machine in &machines {
                let solver = Solver::new(machine, SolverConfig::for_depth(10)).expect("config fits");
                black_box(solver.run().expect("search runs").outcome.is_success());
            }
        });
    });
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
