//! Multi-population (island) genetic algorithm with ring migration.

use crate::chromosome::Chromosome;
use crate::engine::should_terminate;
use crate::population::{IslandKind, IslandProfile, Population};
use crate::problem::Problem;
use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

/// Evolves several independent populations and periodically migrates elites
/// from island `i` to island `(i + 1) mod N`.
pub struct IslandEngine<'a> {
    pub problem: Problem<'a>,
    pub islands: Vec<Population>,
    pub best_chromosome: Option<Chromosome>,
    /// Global best-ever fitness after each generation
    pub fitness_history: Vec<f64>,
    pub generations: u32,
    pub generations_without_improvement: u32,
    pub migrations: u32,
    pub run_time: Duration,
    start_time: Instant,
}

impl<'a> IslandEngine<'a> {
    pub fn new(problem: Problem<'a>) -> Self {
        IslandEngine {
            problem,
            islands: Vec::new(),
            best_chromosome: None,
            fitness_history: Vec::new(),
            generations: 0,
            generations_without_improvement: 0,
            migrations: 0,
            run_time: Duration::from_secs(0),
            start_time: Instant::now(),
        }
    }

    /// Type of an island, cycling through the configured list.
    pub fn island_kind(&self, island_index: usize) -> IslandKind {
        let types = &self.problem.config.island_types;
        if types.is_empty() {
            IslandKind::Profit
        } else {
            types[island_index % types.len()]
        }
    }

    /// Build and evaluate every island's initial population.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        let num_islands = self.problem.config.num_islands.max(1);
        self.islands = (0..num_islands)
            .map(|i| {
                let profile = IslandProfile::for_kind(self.island_kind(i), self.problem.config);
                Population::initialize(&self.problem, profile, rng)
            })
            .collect();
        for (i, island) in self.islands.iter().enumerate() {
            debug!(
                "island {}: {} (best {:.2})",
                i,
                island.profile.kind,
                island.best().map_or(0.0, |c| c.fitness)
            );
        }

        self.best_chromosome = self.generation_best().cloned();
        self.fitness_history.clear();
        self.generations = 0;
        self.generations_without_improvement = 0;
        self.migrations = 0;
    }

    /// Run until termination and return the global best chromosome.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Chromosome {
        self.start_time = Instant::now();
        self.initialize(rng);

        info!(
            "island GA start: {} islands of {}, {} orders",
            self.islands.len(),
            self.problem.config.population_size,
            self.problem.num_orders()
        );

        let interval = self.problem.config.migration_interval;

        while !should_terminate(
            self.problem,
            self.generations,
            self.generations_without_improvement,
            self.start_time,
        ) {
            for island in self.islands.iter_mut() {
                island.evolve_generation(&self.problem, rng);
            }
            self.generations += 1;

            if interval > 0 && self.generations % interval == 0 {
                self.migrate();
            }

            let improved = match (self.generation_best(), &self.best_chromosome) {
                (Some(current), Some(best)) => current.fitness > best.fitness,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if improved {
                self.best_chromosome = self.generation_best().cloned();
                self.generations_without_improvement = 0;
            } else {
                self.generations_without_improvement += 1;
            }
            self.fitness_history.push(self.best_fitness());

            if self.generations % 10 == 0 {
                debug!(
                    "island generation {}/{}: global best {:.2}",
                    self.generations,
                    self.problem.config.max_generations,
                    self.best_fitness()
                );
            }
        }

        self.run_time = self.start_time.elapsed();
        info!(
            "island GA finished after {} generations ({} migrations): best fitness {:.2}",
            self.generations,
            self.migrations,
            self.best_fitness()
        );

        self.best_chromosome.clone().unwrap_or_default()
    }

    /// One ring migration: every island's top individuals overwrite the worst
    /// individuals of the next island. Elites are taken before any island changes.
    pub fn migrate(&mut self) {
        let num_islands = self.islands.len();
        if num_islands <= 1 {
            return;
        }
        let elite_count = self.problem.config.migration_elite_count.max(1);

        let emigrants: Vec<Vec<Chromosome>> = self
            .islands
            .iter()
            .map(|island| island.elites(elite_count))
            .collect();

        for (src, elites) in emigrants.iter().enumerate() {
            if elites.is_empty() {
                continue;
            }
            let dst = (src + 1) % num_islands;
            self.islands[dst].replace_worst(elites);
        }

        self.migrations += 1;
        debug!("migration {} done", self.migrations);
    }

    /// Best individual over all islands; on ties the lowest island index wins.
    pub fn generation_best(&self) -> Option<&Chromosome> {
        self.islands
            .iter()
            .filter_map(|island| island.best())
            .fold(None, |best: Option<&Chromosome>, c| match best {
                Some(b) if b.fitness >= c.fitness => Some(b),
                _ => Some(c),
            })
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_chromosome
            .as_ref()
            .map(|c| c.fitness)
            .unwrap_or(f64::NEG_INFINITY)
    }
}
