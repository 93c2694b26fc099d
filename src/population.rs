//! Population management shared by the single-population and island engines.

use crate::chromosome::{by_fitness_desc, Chromosome};
use crate::config::Config;
use crate::fitness;
use crate::genetic::Genetic;
use crate::problem::Problem;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Search bias of an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IslandKind {
    /// Stronger selection pressure
    Profit,
    /// More earliest-due-date seeds
    Delivery,
    /// Higher mutation rate, more random seeds
    Explore,
}

impl fmt::Display for IslandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IslandKind::Profit => "profit",
            IslandKind::Delivery => "delivery",
            IslandKind::Explore => "explore",
        };
        f.write_str(name)
    }
}

/// Evolution parameters of one population.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandProfile {
    pub kind: IslandKind,
    /// Share of individuals initialized with a shuffled priority gene
    pub random_ratio: f64,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub population_size: usize,
    pub elite_size: usize,
}

impl IslandProfile {
    /// Profile of the single-population engine.
    pub fn standard(config: &Config) -> Self {
        IslandProfile {
            kind: IslandKind::Profit,
            random_ratio: config.random_init_ratio,
            tournament_size: config.tournament_size,
            mutation_rate: config.mutation_rate,
            crossover_rate: config.crossover_rate,
            population_size: config.population_size,
            elite_size: config.elite_size,
        }
    }

    /// Profile of an island of the given kind.
    ///
    /// A profit island with unit selection pressure equals the standard profile
    /// whenever the base tournament holds at least two individuals.
    pub fn for_kind(kind: IslandKind, config: &Config) -> Self {
        let mut profile = Self::standard(config);
        profile.kind = kind;
        match kind {
            IslandKind::Profit => {
                let scaled = (config.tournament_size as f64 * config.profit_selection_pressure).round();
                profile.tournament_size = (scaled as usize).max(2);
            }
            IslandKind::Delivery => {
                profile.random_ratio = 0.5;
            }
            IslandKind::Explore => {
                profile.random_ratio = 0.9;
                profile.mutation_rate =
                    (config.mutation_rate * config.exploration_mutation_scale).clamp(0.0, 1.0);
            }
        }
        profile
    }
}

/// One evolving population.
pub struct Population {
    /// Individuals, sorted by descending fitness after every generation
    pub individuals: Vec<Chromosome>,
    pub profile: IslandProfile,
}

impl Population {
    /// Create and evaluate the initial population: a `random_ratio` share of
    /// fully random individuals, the rest seeded with the earliest-due-date priority.
    pub fn initialize<R: Rng>(problem: &Problem, profile: IslandProfile, rng: &mut R) -> Self {
        let size = profile.population_size;
        let num_random = ((size as f64 * profile.random_ratio) as usize).min(size);

        let mut individuals = Vec::with_capacity(size);
        for _ in 0..num_random {
            individuals.push(Chromosome::random(problem, rng));
        }
        if num_random < size {
            let edd = problem.edd_priority();
            for _ in num_random..size {
                individuals.push(Chromosome::with_priority(problem, edd.clone(), rng));
            }
        }

        evaluate_all(&mut individuals, problem);

        Population {
            individuals,
            profile,
        }
    }

    /// Evolve one generation: tournament selection, pairwise crossover, mutation,
    /// then keep the best `population_size` of `elite ∪ offspring`.
    pub fn evolve_generation<R: Rng>(&mut self, problem: &Problem, rng: &mut R) {
        if self.individuals.is_empty() {
            return;
        }
        let tournament_size = self.profile.tournament_size;
        let crossover_rate = self.profile.crossover_rate;
        let mutation_rate = self.profile.mutation_rate;
        let population_size = self.profile.population_size;
        let num_products = problem.config.num_products;

        let parents: Vec<&Chromosome> = (0..population_size)
            .filter_map(|_| Genetic::tournament(&self.individuals, tournament_size, rng))
            .collect();

        let mut offspring = Vec::with_capacity(parents.len());
        for pair in parents.chunks_exact(2) {
            let (parent1, parent2) = (pair[0], pair[1]);

            let (mut child1, mut child2) = if rng.gen::<f64>() < crossover_rate {
                Genetic::crossover(parent1, parent2, rng)
            } else {
                (parent1.clone(), parent2.clone())
            };

            Genetic::mutate(&mut child1, mutation_rate, num_products, rng);
            Genetic::mutate(&mut child2, mutation_rate, num_products, rng);

            offspring.push(child1);
            offspring.push(child2);
        }

        evaluate_all(&mut offspring, problem);

        // Elitism
        self.sort();
        let elite_count = self.profile.elite_size.min(self.individuals.len());
        let mut combined: Vec<Chromosome> = self.individuals.drain(..elite_count).collect();
        combined.extend(offspring);
        combined.sort_by(by_fitness_desc);
        combined.truncate(population_size);
        self.individuals = combined;
    }

    /// Sort by descending fitness. The sort is stable, so equal fitness keeps insertion order.
    pub fn sort(&mut self) {
        self.individuals.sort_by(by_fitness_desc);
    }

    /// Fittest individual, first one on ties.
    pub fn best(&self) -> Option<&Chromosome> {
        self.individuals
            .iter()
            .fold(None, |best: Option<&Chromosome>, c| match best {
                Some(b) if b.fitness >= c.fitness => Some(b),
                _ => Some(c),
            })
    }

    /// Deep copies of the `count` fittest individuals.
    pub fn elites(&self, count: usize) -> Vec<Chromosome> {
        let mut sorted: Vec<&Chromosome> = self.individuals.iter().collect();
        sorted.sort_by(|a, b| by_fitness_desc(a, b));
        sorted.into_iter().take(count).cloned().collect()
    }

    /// Replace the worst individuals by `immigrants`, leaving the best ones untouched.
    pub fn replace_worst(&mut self, immigrants: &[Chromosome]) {
        if self.individuals.is_empty() {
            return;
        }
        let k = immigrants.len().min(self.individuals.len());
        self.sort();
        let keep = self.individuals.len() - k;
        self.individuals.truncate(keep);
        self.individuals.extend(immigrants.iter().take(k).cloned());
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn average_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.individuals.iter().map(|c| c.fitness).sum::<f64>() / self.individuals.len() as f64
    }
}

/// Evaluate every chromosome. Evaluation draws no randomness, so running it in
/// parallel keeps seeded runs reproducible.
pub fn evaluate_all(chromosomes: &mut [Chromosome], problem: &Problem) {
    chromosomes
        .par_iter_mut()
        .for_each(|c| fitness::assign_fitness(c, problem));
}
