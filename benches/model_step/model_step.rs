use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tiered_resistance::{Model, Parameters};

static SEED: u64 = 123;
static TIMESTEPS: usize = 50;

fn parameters(population_size: usize) -> Parameters {
    Parameters {
        population_size,
        initially_infected: population_size / 25,
        seed: Some(SEED),
        ..Parameters::default()
    }
}

fn full_run(population_size: usize) -> Model {
    let mut model = Model::new(&parameters(population_size)).expect("valid parameters");
    model.run(TIMESTEPS).expect("run completes");
    model
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("run 250 people", |bencher| {
        bencher.iter_with_large_drop(|| full_run(250));
    });
    c.bench_function("run 10000 people", |bencher| {
        bencher.iter_with_large_drop(|| full_run(10_000));
    });
    c.bench_function("single step of 10000 people", |bencher| {
        bencher.iter_batched(
            || Model::new(&parameters(10_000)).expect("valid parameters"),
            |mut model| {
                model.step().expect("step completes");
                model
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(model_benches, criterion_benchmark);
criterion_main!(model_benches);
