//! Tests for the fitness evaluator.

use prodsched_ga::chromosome::Chromosome;
use prodsched_ga::config::Config;
use prodsched_ga::fitness;
use prodsched_ga::order::Order;
use prodsched_ga::problem::Problem;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_test_orders() -> Vec<Order> {
    vec![
        Order::new(1, 1, 100, 1, 6, 50.0),
        Order::new(2, 2, 120, 1, 12, 60.0),
        Order::new(3, 3, 90, 1, 18, 55.0),
    ]
}

#[test]
fn test_unserved_order_pays_full_penalty() {
    let config = Config::default();
    let orders = vec![Order::new(1, 1, 100, 1, 6, 50.0)];
    let problem = Problem::new(&config, &orders, 1, 6);

    let chromosome = Chromosome::new(vec![0; 18], vec![0]);
    let schedule = fitness::evaluate_with_schedule(&chromosome, &problem);

    assert!(schedule.allocation.is_empty());
    assert_eq!(schedule.revenue, 0.0);
    assert!((schedule.penalty - 100.0 * 50.0 * config.penalty_rate).abs() < 1e-9);
    assert_eq!(schedule.cost, 0.0);
    assert!((schedule.profit + 500.0).abs() < 1e-9);
}

#[test]
fn test_served_order_profit() {
    let config = Config::default();
    let orders = vec![Order::new(1, 1, 100, 1, 6, 50.0)];
    let problem = Problem::new(&config, &orders, 1, 6);

    let mut gene = vec![0; 18];
    gene[0] = 1;
    gene[1] = 1;
    let chromosome = Chromosome::new(gene, vec![0]);
    let schedule = fitness::evaluate_with_schedule(&chromosome, &problem);

    assert_eq!(schedule.revenue, 5000.0);
    assert_eq!(schedule.cost, 200.0);
    assert_eq!(schedule.penalty, 0.0);
    assert_eq!(fitness::evaluate(&chromosome, &problem), 4800.0);
}

#[test]
fn test_idle_capacity_costs_nothing() {
    let config = Config::default();
    let orders = vec![Order::new(1, 1, 100, 1, 6, 50.0)];
    let problem = Problem::new(&config, &orders, 1, 6);

    // Product 2 is assigned everywhere but nobody orders it.
    let chromosome = Chromosome::new(vec![2; 18], vec![0]);
    let schedule = fitness::evaluate_with_schedule(&chromosome, &problem);

    assert_eq!(schedule.cost, 0.0);
}

#[test]
fn test_profit_decomposition() {
    let config = Config::default();
    let orders = create_test_orders();
    let problem = Problem::new(&config, &orders, 1, 18);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for _ in 0..30 {
        let chromosome = Chromosome::random(&problem, &mut rng);
        let schedule = fitness::evaluate_with_schedule(&chromosome, &problem);
        let expected = schedule.revenue - schedule.cost - schedule.penalty;
        assert!((schedule.profit - expected).abs() < 1e-9);
    }
}

#[test]
fn test_penalty_compares_against_open_demand() {
    let config = Config::default();
    let mut order = Order::new(1, 1, 100, 1, 12, 50.0);
    order.remaining = 50;
    let orders = vec![order];
    let problem = Problem::new(&config, &orders, 7, 6);

    let mut gene = vec![0; 18];
    gene[0] = 1;
    let chromosome = Chromosome::new(gene, vec![0]);
    let schedule = fitness::evaluate_with_schedule(&chromosome, &problem);

    assert_eq!(schedule.completed_quantity(1), 50);
    assert_eq!(schedule.penalty, 0.0);
    assert_eq!(schedule.revenue, 2500.0);
}

#[test]
fn test_assign_fitness() {
    let config = Config::default();
    let orders = create_test_orders();
    let problem = Problem::new(&config, &orders, 1, 12);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut chromosome = Chromosome::random(&problem, &mut rng);
    fitness::assign_fitness(&mut chromosome, &problem);

    assert_eq!(chromosome.fitness, fitness::evaluate(&chromosome, &problem));
}
