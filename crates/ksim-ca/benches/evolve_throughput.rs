use criterion::{criterion_group, criterion_main, Criterion};
use ksim_ca::{random_configuration, Automaton};
use ksim_core::RngHandle;

fn bench_evolve(c: &mut Criterion) {
    let mut rng = RngHandle::from_seed(42);
    let initial = random_configuration(512, 3, &mut rng).unwrap();

    c.bench_function("automaton_evolve_512x256", |b| {
        b.iter(|| {
            let mut automaton = Automaton::new(12_345, initial.as_slice(), 3).unwrap();
            automaton.evolve(256);
            automaton
        })
    });
}

criterion_group!(benches, bench_evolve);
criterion_main!(benches);
