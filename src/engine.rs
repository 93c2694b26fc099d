//! Single-population genetic algorithm and the engine dispatcher.

use crate::chromosome::Chromosome;
use crate::island::IslandEngine;
use crate::population::{IslandProfile, Population};
use crate::problem::Problem;
use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

/// Generations without improvement of the best-ever fitness after which any engine stops.
pub const STALL_LIMIT: u32 = 20;

/// The single-population evolutionary loop.
pub struct GaEngine<'a> {
    pub problem: Problem<'a>,
    pub population: Population,
    /// Deep copy of the best chromosome seen so far
    pub best_chromosome: Option<Chromosome>,
    /// Best-ever fitness after each generation
    pub fitness_history: Vec<f64>,
    pub generations: u32,
    pub generations_without_improvement: u32,
    pub run_time: Duration,
    start_time: Instant,
}

impl<'a> GaEngine<'a> {
    /// Create an engine for the given planning window.
    pub fn new(problem: Problem<'a>) -> Self {
        let profile = IslandProfile::standard(problem.config);
        GaEngine {
            problem,
            population: Population {
                individuals: Vec::new(),
                profile,
            },
            best_chromosome: None,
            fitness_history: Vec::new(),
            generations: 0,
            generations_without_improvement: 0,
            run_time: Duration::from_secs(0),
            start_time: Instant::now(),
        }
    }

    /// Build and evaluate the initial population.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        let profile = self.population.profile.clone();
        self.population = Population::initialize(&self.problem, profile, rng);
        self.best_chromosome = self.population.best().cloned();
        self.fitness_history.clear();
        self.generations = 0;
        self.generations_without_improvement = 0;
    }

    /// Run the algorithm until the termination criteria are met and return the best chromosome.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Chromosome {
        self.start_time = Instant::now();
        self.initialize(rng);

        info!(
            "GA start: population {}, {} orders, window slots {}..={}",
            self.population.len(),
            self.problem.num_orders(),
            self.problem.start_slot,
            self.problem.end_slot()
        );

        while !self.should_terminate() {
            self.population.evolve_generation(&self.problem, rng);
            self.generations += 1;

            let improved = match (self.population.best(), &self.best_chromosome) {
                (Some(current), Some(best)) => current.fitness > best.fitness,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if improved {
                self.best_chromosome = self.population.best().cloned();
                self.generations_without_improvement = 0;
            } else {
                self.generations_without_improvement += 1;
            }

            let best_fitness = self.best_fitness();
            self.fitness_history.push(best_fitness);

            if self.generations % 10 == 0 {
                debug!(
                    "generation {}/{}: best {:.2}, average {:.2}",
                    self.generations,
                    self.problem.config.max_generations,
                    best_fitness,
                    self.population.average_fitness()
                );
            }
        }

        self.run_time = self.start_time.elapsed();
        info!(
            "GA finished after {} generations: best fitness {:.2}",
            self.generations,
            self.best_fitness()
        );

        self.best_chromosome.clone().unwrap_or_default()
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_chromosome
            .as_ref()
            .map(|c| c.fitness)
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Check if the termination criteria are met.
    fn should_terminate(&self) -> bool {
        should_terminate(
            self.problem,
            self.generations,
            self.generations_without_improvement,
            self.start_time,
        )
    }
}

/// Termination test shared by both engines, evaluated at generation boundaries.
pub(crate) fn should_terminate(
    problem: Problem,
    generations: u32,
    generations_without_improvement: u32,
    start_time: Instant,
) -> bool {
    if generations >= problem.config.max_generations {
        return true;
    }
    if generations_without_improvement >= STALL_LIMIT {
        debug!("stopping after {} generations without improvement", STALL_LIMIT);
        return true;
    }
    if let Some(time_limit) = problem.config.time_limit {
        if start_time.elapsed() >= time_limit {
            return true;
        }
    }
    false
}

/// Run the configured genetic search on a window: the island engine when
/// islands are enabled and more than one is configured, the single-population
/// engine otherwise.
pub fn run_ga<R: Rng>(problem: Problem, rng: &mut R) -> Chromosome {
    if problem.config.uses_islands() {
        IslandEngine::new(problem).run(rng)
    } else {
        GaEngine::new(problem).run(rng)
    }
}
