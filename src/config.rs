//! Configuration parameters for the production scheduler.

use crate::error::ConfigError;
use crate::population::IslandKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Configuration settings for the scheduler and its search engines.
///
/// A `Config` is built once per run and shared by reference; nothing in the
/// crate mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of production lines
    pub num_lines: u32,
    /// Number of products (ids `1..=num_products`)
    pub num_products: u32,
    /// Number of slots in one day
    pub slots_per_day: u32,
    /// Units of a product one line produces in one slot
    pub throughput: BTreeMap<u32, u32>,
    /// Labor cost of one working line-slot, looked up cyclically by slot
    pub labor_costs: Vec<f64>,
    /// Share of an order's value charged when it is not delivered
    pub penalty_rate: f64,

    /// Individuals per population
    pub population_size: usize,
    /// Maximum number of generations
    pub max_generations: u32,
    /// Probability that a parent pair is recombined
    pub crossover_rate: f64,
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    /// Individuals carried over unchanged into the next generation
    pub elite_size: usize,
    /// Base tournament size for parent selection
    pub tournament_size: usize,
    /// Share of the initial population with a shuffled priority gene
    pub random_init_ratio: f64,

    /// Use the island model when `num_islands > 1`
    pub enable_island_ga: bool,
    pub num_islands: usize,
    /// Generations between two ring migrations
    pub migration_interval: u32,
    /// Individuals each island sends per migration
    pub migration_elite_count: usize,
    /// Island types, assigned round-robin
    pub island_types: Vec<IslandKind>,
    /// Tournament size multiplier on profit islands
    pub profit_selection_pressure: f64,
    /// Mutation rate multiplier on explore islands
    pub exploration_mutation_scale: f64,

    /// Iteration cap of the greedy local search
    pub max_ls_iterations: u32,
    /// Consecutive non-improvements before the greedy local search stops
    pub ls_no_improvement_limit: u32,
    /// Switch the local search to the risk-guided annealing mode
    pub enable_risk_guided_ls: bool,
    pub risk_weight_penalty: f64,
    pub risk_weight_demand_gap: f64,
    pub risk_weight_urgency: f64,
    pub risk_threshold_high: f64,
    pub risk_threshold_medium: f64,
    pub risk_ls_max_iterations: u32,
    pub risk_ls_no_improvement_limit: u32,
    pub annealing_init_accept_prob: f64,
    pub annealing_decay_rate: f64,
    pub annealing_min_accept_prob: f64,

    /// Length of the re-planning window in days
    pub planning_horizon_days: u32,
    /// Idle a day whose planned standalone profit is negative
    pub enable_stoploss: bool,
    /// Seed for the run's random source
    pub seed: Option<u64>,
    /// Optional wall-clock limit, checked between generations
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_lines: 3,
            num_products: 3,
            slots_per_day: 6,
            throughput: BTreeMap::from([(1, 50), (2, 60), (3, 55)]),
            labor_costs: vec![100.0, 100.0, 115.0, 135.0, 150.0, 140.0],
            penalty_rate: 0.1,
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            elite_size: 5,
            tournament_size: 3,
            random_init_ratio: 0.8,
            enable_island_ga: false,
            num_islands: 1,
            migration_interval: 20,
            migration_elite_count: 2,
            island_types: vec![IslandKind::Profit, IslandKind::Delivery, IslandKind::Explore],
            profit_selection_pressure: 1.0,
            exploration_mutation_scale: 1.5,
            max_ls_iterations: 50,
            ls_no_improvement_limit: 10,
            enable_risk_guided_ls: false,
            risk_weight_penalty: 1.0,
            risk_weight_demand_gap: 1.0,
            risk_weight_urgency: 1.0,
            risk_threshold_high: 0.7,
            risk_threshold_medium: 0.4,
            risk_ls_max_iterations: 50,
            risk_ls_no_improvement_limit: 10,
            annealing_init_accept_prob: 0.3,
            annealing_decay_rate: 0.95,
            annealing_min_accept_prob: 0.01,
            planning_horizon_days: 10,
            enable_stoploss: false,
            seed: None,
            time_limit: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural preconditions the search engines rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_lines == 0 {
            return Err(ConfigError::NoLines);
        }
        if self.num_products == 0 {
            return Err(ConfigError::NoProducts);
        }
        if self.slots_per_day == 0 || 24 % self.slots_per_day != 0 {
            return Err(ConfigError::InvalidSlotsPerDay(self.slots_per_day));
        }
        if self.throughput.is_empty() {
            return Err(ConfigError::EmptyThroughput);
        }
        if let Some(product) = (1..=self.num_products).find(|p| !self.throughput.contains_key(p)) {
            return Err(ConfigError::MissingThroughput(product));
        }
        if self.labor_costs.is_empty() {
            return Err(ConfigError::EmptyLaborCosts);
        }

        let probabilities = [
            ("penalty_rate", self.penalty_rate),
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("random_init_ratio", self.random_init_ratio),
            ("annealing_init_accept_prob", self.annealing_init_accept_prob),
            ("annealing_decay_rate", self.annealing_decay_rate),
            ("annealing_min_accept_prob", self.annealing_min_accept_prob),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elite_size > self.population_size {
            return Err(ConfigError::EliteTooLarge {
                elite: self.elite_size,
                population: self.population_size,
            });
        }
        if self.num_islands == 0 {
            return Err(ConfigError::NoIslands);
        }
        if self.enable_island_ga && self.island_types.is_empty() {
            return Err(ConfigError::NoIslandTypes);
        }
        if self.planning_horizon_days == 0 {
            return Err(ConfigError::EmptyHorizon);
        }
        Ok(())
    }

    /// Labor cost of one working line during the given 1-based global slot.
    pub fn labor_cost(&self, slot: u32) -> f64 {
        if self.labor_costs.is_empty() || slot == 0 {
            return 0.0;
        }
        self.labor_costs[(slot as usize - 1) % self.labor_costs.len()]
    }

    /// Units one line produces of `product` in one slot.
    pub fn throughput_of(&self, product: u32) -> u32 {
        self.throughput.get(&product).copied().unwrap_or(0)
    }

    /// Number of slots in one re-planning window.
    pub fn planning_horizon_slots(&self) -> usize {
        (self.planning_horizon_days * self.slots_per_day) as usize
    }

    /// Whether the island engine replaces the single-population engine.
    pub fn uses_islands(&self) -> bool {
        self.enable_island_ga && self.num_islands > 1
    }

    /// Set the number of production lines.
    pub fn with_num_lines(mut self, lines: u32) -> Self {
        self.num_lines = lines;
        self
    }

    /// Set the number of products.
    pub fn with_num_products(mut self, products: u32) -> Self {
        self.num_products = products;
        self
    }

    /// Set the per-product throughput table.
    pub fn with_throughput(mut self, throughput: BTreeMap<u32, u32>) -> Self {
        self.throughput = throughput;
        self
    }

    /// Set the labor cost table.
    pub fn with_labor_costs(mut self, costs: Vec<f64>) -> Self {
        self.labor_costs = costs;
        self
    }

    /// Set the penalty rate.
    pub fn with_penalty_rate(mut self, rate: f64) -> Self {
        self.penalty_rate = rate;
        self
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the maximum number of generations.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Set the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Set the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the number of elite individuals.
    pub fn with_elite_size(mut self, size: usize) -> Self {
        self.elite_size = size;
        self
    }

    /// Enable the island model with the given number of islands.
    pub fn with_islands(mut self, islands: usize) -> Self {
        self.enable_island_ga = true;
        self.num_islands = islands;
        self
    }

    /// Set the migration interval and elite count.
    pub fn with_migration(mut self, interval: u32, elite_count: usize) -> Self {
        self.migration_interval = interval;
        self.migration_elite_count = elite_count;
        self
    }

    /// Set the island types.
    pub fn with_island_types(mut self, types: Vec<IslandKind>) -> Self {
        self.island_types = types;
        self
    }

    /// Set the greedy local search iteration cap.
    pub fn with_max_ls_iterations(mut self, iterations: u32) -> Self {
        self.max_ls_iterations = iterations;
        self
    }

    /// Switch between greedy and risk-guided local search.
    pub fn with_risk_guided_ls(mut self, enabled: bool) -> Self {
        self.enable_risk_guided_ls = enabled;
        self
    }

    /// Set the planning horizon in days.
    pub fn with_planning_horizon_days(mut self, days: u32) -> Self {
        self.planning_horizon_days = days;
        self
    }

    /// Enable or disable the stop-loss guard.
    pub fn with_stoploss(mut self, enabled: bool) -> Self {
        self.enable_stoploss = enabled;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }
}
