//! Benchmarks for the genetic search and the local search.

#[cfg(feature = "bench")]
extern crate criterion;

#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use prodsched_ga::config::Config;
use prodsched_ga::order::Order;
use prodsched_ga::problem::Problem;
use prodsched_ga::GaEngine;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Create `size` orders spread over the products and the first days.
fn create_benchmark_orders(size: u32) -> Vec<Order> {
    (1..=size)
        .map(|id| {
            let product = (id - 1) % 3 + 1;
            let release = ((id - 1) % 3) * 6 + 1;
            Order::new(id, product, 50 + (id * 37) % 150, release, release + 12, 50.0 + product as f64 * 5.0)
        })
        .collect()
}

#[cfg(feature = "bench")]
fn benchmark_initialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialization");
    let config = Config::new();

    for size in [10, 30, 60].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let orders = create_benchmark_orders(size);
            let problem = Problem::with_horizon(&config, &orders, 1);
            let mut rng = ChaCha8Rng::seed_from_u64(1);

            b.iter(|| {
                let mut engine = GaEngine::new(problem);
                engine.initialize(&mut rng);
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_local_search(c: &mut Criterion) {
    use prodsched_ga::local_search::LocalSearch;

    let mut group = c.benchmark_group("local_search");

    for risk in [false, true] {
        let config = Config::new().with_risk_guided_ls(risk);
        let orders = create_benchmark_orders(30);
        let problem = Problem::with_horizon(&config, &orders, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let mut engine = GaEngine::new(problem);
        engine.initialize(&mut rng);
        let start = engine.population.individuals[0].clone();

        group.bench_function(if risk { "risk_guided" } else { "greedy" }, |b| {
            let mut local_search = LocalSearch::new(&config);
            b.iter(|| local_search.improve(&start, &problem, &mut rng));
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_convergence(c: &mut Criterion) {
    let mut group = c.benchmark_group("convergence");
    group.measurement_time(Duration::from_secs(30));
    group.sample_size(10);

    for size in [10, 30].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let config = Config::new()
                .with_max_generations(50)
                .with_time_limit(Duration::from_secs(10));
            let orders = create_benchmark_orders(size);
            let problem = Problem::with_horizon(&config, &orders, 1);
            let mut rng = ChaCha8Rng::seed_from_u64(3);

            b.iter(|| {
                let mut engine = GaEngine::new(problem);
                engine.run(&mut rng);
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(
    benches,
    benchmark_initialization,
    benchmark_local_search,
    benchmark_convergence
);

#[cfg(feature = "bench")]
criterion_main!(benches);
