//! Integration tests for the single-population engine and the dispatcher.

use prodsched_ga::config::Config;
use prodsched_ga::engine::{run_ga, GaEngine, STALL_LIMIT};
use prodsched_ga::fitness;
use prodsched_ga::island::IslandEngine;
use prodsched_ga::order::Order;
use prodsched_ga::problem::Problem;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

fn create_test_orders() -> Vec<Order> {
    vec![
        Order::new(1, 1, 100, 1, 6, 50.0),
        Order::new(2, 2, 120, 1, 12, 60.0),
        Order::new(3, 3, 90, 1, 18, 55.0),
        Order::new(4, 1, 150, 1, 12, 50.0),
        Order::new(5, 2, 130, 1, 18, 60.0),
        Order::new(6, 3, 110, 1, 24, 55.0),
    ]
}

fn small_config() -> Config {
    Config::new()
        .with_population_size(10)
        .with_elite_size(2)
        .with_max_generations(15)
}

#[test]
fn test_engine_returns_valid_best() {
    let config = small_config();
    let orders = create_test_orders();
    let problem = Problem::new(&config, &orders, 1, 12);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut engine = GaEngine::new(problem);
    let best = engine.run(&mut rng);

    assert!(best.is_valid(3, 12, config.num_products, orders.len()));
    assert_eq!(best.fitness, fitness::evaluate(&best, &problem));
    assert!(engine.generations <= config.max_generations);
    assert_eq!(engine.fitness_history.len(), engine.generations as usize);
    assert!(engine.fitness_history.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(engine.fitness_history.last().copied(), Some(best.fitness));
}

#[test]
fn test_engine_stops_on_stall() {
    let config = small_config().with_max_generations(100);
    let orders: Vec<Order> = Vec::new();
    let problem = Problem::new(&config, &orders, 1, 6);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut engine = GaEngine::new(problem);
    let best = engine.run(&mut rng);

    assert_eq!(best.fitness, 0.0);
    assert_eq!(engine.generations, STALL_LIMIT);
}

#[test]
fn test_engine_respects_time_limit() {
    let config = small_config().with_time_limit(Duration::ZERO);
    let orders = create_test_orders();
    let problem = Problem::new(&config, &orders, 1, 12);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut engine = GaEngine::new(problem);
    let best = engine.run(&mut rng);

    assert_eq!(engine.generations, 0);
    assert!(engine.fitness_history.is_empty());
    assert!(best.is_permutation(orders.len()));
}

#[test]
fn test_single_island_matches_engine() {
    let config = small_config().with_max_generations(25);
    let orders = create_test_orders();
    let problem = Problem::new(&config, &orders, 1, 12);

    let mut ga_rng = ChaCha8Rng::seed_from_u64(2024);
    let mut ga = GaEngine::new(problem);
    let ga_best = ga.run(&mut ga_rng);

    let island_config = config.clone().with_islands(1);
    let island_problem = Problem::new(&island_config, &orders, 1, 12);
    let mut island_rng = ChaCha8Rng::seed_from_u64(2024);
    let mut islands = IslandEngine::new(island_problem);
    let island_best = islands.run(&mut island_rng);

    assert_eq!(ga.fitness_history, islands.fitness_history);
    assert_eq!(ga_best.fitness, island_best.fitness);
    assert_eq!(ga_best.gene_priority, island_best.gene_priority);
}

#[test]
fn test_run_ga_is_reproducible() {
    let config = small_config().with_islands(3).with_migration(5, 2);
    let orders = create_test_orders();
    let problem = Problem::new(&config, &orders, 1, 12);

    let first = run_ga(problem, &mut ChaCha8Rng::seed_from_u64(8));
    let second = run_ga(problem, &mut ChaCha8Rng::seed_from_u64(8));

    assert_eq!(first.fitness, second.fitness);
    assert_eq!(first.gene_capacity, second.gene_capacity);
    assert!(first.is_valid(3, 12, config.num_products, orders.len()));
}
