//! Error types for configuration, order loading and schedule bookkeeping.

use thiserror::Error;

/// Rejected configuration values, reported by [`crate::config::Config::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("number of production lines must be positive")]
    NoLines,
    #[error("number of products must be positive")]
    NoProducts,
    #[error("slots per day must be positive and divide 24 hours evenly, got {0}")]
    InvalidSlotsPerDay(u32),
    #[error("throughput table is empty")]
    EmptyThroughput,
    #[error("product {0} has no throughput entry")]
    MissingThroughput(u32),
    #[error("labor cost table is empty")]
    EmptyLaborCosts,
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("population size must be positive")]
    EmptyPopulation,
    #[error("elite size {elite} exceeds population size {population}")]
    EliteTooLarge { elite: usize, population: usize },
    #[error("island count must be positive")]
    NoIslands,
    #[error("island model enabled without any island types")]
    NoIslandTypes,
    #[error("planning horizon must span at least one day")]
    EmptyHorizon,
}

/// Failures while loading an order pool.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("failed to read orders: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed order file: {0}")]
    Csv(#[from] csv::Error),
    #[error("order {order_id} is invalid: {reason}")]
    Invalid { order_id: u32, reason: String },
}

/// Internal consistency failures of the rolling bookkeeping.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("profit bookkeeping diverged: total {total:.4} != sum of daily profits {sum:.4}")]
    ProfitMismatch { total: f64, sum: f64 },
}
