//! Tests for configuration validation and the order pool.

use prodsched_ga::config::Config;
use prodsched_ga::error::{ConfigError, OrderError};
use prodsched_ga::order::{Order, OrderPool};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();

    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.planning_horizon_slots(), 60);
    assert_eq!(config.throughput_of(2), 60);
    assert!(!config.uses_islands());
}

#[test]
fn test_config_validation_errors() {
    assert_eq!(Config::new().with_num_lines(0).validate(), Err(ConfigError::NoLines));
    assert_eq!(
        Config::new().with_throughput(BTreeMap::from([(1, 50), (2, 60)])).validate(),
        Err(ConfigError::MissingThroughput(3))
    );
    assert_eq!(
        Config::new().with_labor_costs(Vec::new()).validate(),
        Err(ConfigError::EmptyLaborCosts)
    );
    assert!(matches!(
        Config::new().with_mutation_rate(1.5).validate(),
        Err(ConfigError::InvalidProbability { name: "mutation_rate", .. })
    ));
    assert_eq!(
        Config::new().with_population_size(4).with_elite_size(5).validate(),
        Err(ConfigError::EliteTooLarge { elite: 5, population: 4 })
    );
    assert_eq!(Config::new().with_islands(0).validate(), Err(ConfigError::NoIslands));
    assert_eq!(
        Config::new().with_planning_horizon_days(0).validate(),
        Err(ConfigError::EmptyHorizon)
    );
}

#[test]
fn test_labor_cost_is_cyclic() {
    let config = Config::default();

    assert_eq!(config.labor_cost(1), 100.0);
    assert_eq!(config.labor_cost(4), 135.0);
    assert_eq!(config.labor_cost(7), 100.0);
    assert_eq!(config.labor_cost(12), 140.0);
}

#[test]
fn test_islands_need_more_than_one() {
    assert!(!Config::new().with_islands(1).uses_islands());
    assert!(Config::new().with_islands(3).uses_islands());
}

#[test]
fn test_config_from_json_file() {
    let file = write_temp(r#"{ "num_lines": 2, "penalty_rate": 0.2, "island_types": ["explore"] }"#);

    let config = Config::from_json_file(file.path()).unwrap();

    assert_eq!(config.num_lines, 2);
    assert_eq!(config.penalty_rate, 0.2);
    assert_eq!(config.population_size, 50);
    assert_eq!(config.island_types.len(), 1);
}

#[test]
fn test_config_from_invalid_json_file() {
    let file = write_temp(r#"{ "num_products": 0 }"#);
    assert!(Config::from_json_file(file.path()).is_err());
}

#[test]
fn test_order_pool_from_csv() {
    let file = write_temp(
        "order_id,product,quantity,release_slot,due_slot,unit_price\n\
         1,1,100,1,6,50.0\n\
         2,2,120,7,12,60.0\n\
         3,3,90,1,13,55.0\n",
    );

    let pool = OrderPool::from_csv(file.path(), 6, false).unwrap();
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.get(2).unwrap().release_slot, 7);
    assert_eq!(pool.get(1).unwrap().due_slot, 6);

    let adjusted = OrderPool::from_csv(file.path(), 6, true).unwrap();
    assert_eq!(adjusted.get(1).unwrap().due_slot, 7);
    assert_eq!(adjusted.get(2).unwrap().due_slot, 13);
    assert_eq!(adjusted.get(3).unwrap().due_slot, 19);
}

#[test]
fn test_order_pool_csv_without_release_column() {
    let file = write_temp("order_id,product,quantity,due_slot,unit_price\n4,1,80,18,52.5\n");

    let pool = OrderPool::from_csv(file.path(), 6, false).unwrap();
    let order = pool.get(4).unwrap();

    assert_eq!(order.release_slot, 1);
    assert_eq!(order.remaining, 80);
    assert_eq!(order.unit_price, 52.5);
}

#[test]
fn test_order_pool_rejects_invalid_rows() {
    let file = write_temp("order_id,product,quantity,due_slot,unit_price\n4,1,0,18,52.5\n");
    assert!(matches!(
        OrderPool::from_csv(file.path(), 6, false),
        Err(OrderError::Invalid { order_id: 4, .. })
    ));

    let missing = OrderPool::from_csv("does/not/exist.csv", 6, false);
    assert!(missing.is_err());
}

#[test]
fn test_eligible_orders_and_reset() {
    let mut pool = OrderPool::with_orders(
        6,
        vec![
            Order::new(3, 1, 100, 1, 6, 50.0),
            Order::new(1, 2, 100, 7, 12, 50.0),
            Order::new(2, 3, 100, 1, 12, 50.0),
        ],
    );
    pool.get_mut(2).unwrap().remaining = 0;

    let eligible: Vec<u32> = pool.eligible_orders(1).iter().map(|o| o.order_id).collect();
    assert_eq!(eligible, vec![3]);
    let eligible: Vec<u32> = pool.eligible_orders(7).iter().map(|o| o.order_id).collect();
    assert_eq!(eligible, vec![1, 3]);
    assert_eq!(pool.pending_count(), 2);

    pool.get_mut(3).unwrap().penalized = true;
    pool.reset();
    assert_eq!(pool.pending_count(), 3);
    assert!(pool.orders().all(|o| !o.penalized && o.completed_slot.is_none()));
}

#[test]
fn test_time_to_slot() {
    let pool = OrderPool::new(6);

    assert_eq!(pool.time_to_slot(0, 8), 1);
    assert_eq!(pool.time_to_slot(0, 12), 2);
    assert_eq!(pool.time_to_slot(0, 4), 6);
    assert_eq!(pool.time_to_slot(1, 8), 7);
    assert_eq!(pool.time_to_slot(2, 23), 16);
}
