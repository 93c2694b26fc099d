//! # prodsched-ga
//!
//! A rolling-horizon scheduler for multi-product, multi-line production.
//!
//! Each simulated day the scheduler optimizes a forward window of time slots
//! with a genetic algorithm (optionally split into islands with ring migration)
//! followed by an iterated local search, merges the plan into the global
//! schedule, commits the day's production and charges due-date penalties.
//!
//! A solution is encoded as a chromosome with two genes: the product each line
//! makes in each slot, and a priority permutation of the orders. The decoder
//! turns a chromosome into a concrete allocation, and fitness is
//! `revenue - labor cost - penalty` of the decoded schedule.
//!
//! ```no_run
//! use prodsched_ga::config::Config;
//! use prodsched_ga::order::{Order, OrderPool};
//! use prodsched_ga::rolling::RollingScheduler;
//!
//! let config = Config::new().with_seed(42);
//! let pool = OrderPool::with_orders(
//!     config.slots_per_day,
//!     vec![Order::new(1, 1, 100, 1, 7, 50.0)],
//! );
//! let mut scheduler = RollingScheduler::new(config, pool);
//! let result = scheduler.run_simulation(3).unwrap();
//! println!("profit: {:.2}", result.statistics.total_profit);
//! ```

pub mod chromosome;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod genetic;
pub mod island;
pub mod local_search;
pub mod order;
pub mod population;
pub mod problem;
pub mod rolling;
pub mod schedule;
pub mod utils;

pub use crate::engine::{run_ga, GaEngine};
pub use crate::island::IslandEngine;
pub use crate::rolling::RollingScheduler;
