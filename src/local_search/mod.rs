//! Iterated local search applied to the best chromosome of a genetic run.

pub mod annealing;
pub mod neighborhood;
pub mod risk;

use crate::chromosome::Chromosome;
use crate::config::Config;
use crate::fitness;
use crate::problem::Problem;
use log::debug;
use rand::Rng;

use self::annealing::Annealing;
use self::neighborhood::Neighborhood;
use self::risk::RiskModel;

/// Search mode, chosen once from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchMode {
    /// Hill climbing on random N1/N2 moves, strictly better moves only
    Greedy,
    /// Risk-directed moves with controlled annealing acceptance
    RiskGuided,
}

/// Manages the local search phase.
pub struct LocalSearch {
    pub mode: SearchMode,
    max_iterations: u32,
    no_improvement_limit: u32,
    risk_model: RiskModel,
    annealing: Annealing,
    /// Iterations performed by the last call to [`LocalSearch::improve`]
    pub iterations: u32,
    /// Moves that raised the best fitness in the last call
    pub improvements: u32,
}

impl LocalSearch {
    /// Create a local search configured from `config`.
    pub fn new(config: &Config) -> Self {
        let (mode, max_iterations, no_improvement_limit) = if config.enable_risk_guided_ls {
            (
                SearchMode::RiskGuided,
                config.risk_ls_max_iterations,
                config.risk_ls_no_improvement_limit,
            )
        } else {
            (
                SearchMode::Greedy,
                config.max_ls_iterations,
                config.ls_no_improvement_limit,
            )
        };

        LocalSearch {
            mode,
            max_iterations,
            no_improvement_limit,
            risk_model: RiskModel::from_config(config),
            annealing: Annealing::from_config(config),
            iterations: 0,
            improvements: 0,
        }
    }

    /// Improve a chromosome. The result has its fitness set and is never worse
    /// than the (re-evaluated) input.
    pub fn improve<R: Rng>(&mut self, chromosome: &Chromosome, problem: &Problem, rng: &mut R) -> Chromosome {
        self.iterations = 0;
        self.improvements = 0;

        let mut start = chromosome.clone();
        fitness::assign_fitness(&mut start, problem);

        let improved = match self.mode {
            SearchMode::Greedy => self.greedy(start.clone(), problem, rng),
            SearchMode::RiskGuided => self.risk_guided(start.clone(), problem, rng),
        };

        debug!(
            "local search ({:?}): {:.2} -> {:.2} in {} iterations",
            self.mode, start.fitness, improved.fitness, self.iterations
        );
        improved
    }

    fn greedy<R: Rng>(&mut self, mut current: Chromosome, problem: &Problem, rng: &mut R) -> Chromosome {
        let mut no_improvement = 0;

        for _ in 0..self.max_iterations {
            self.iterations += 1;

            let mut neighbor = current.clone();
            match Neighborhood::random(rng) {
                Neighborhood::SwapSlots => {
                    neighborhood::swap_slots(&mut neighbor, problem.num_lines(), rng)
                }
                Neighborhood::SwapPriority => neighborhood::swap_priority(&mut neighbor, rng),
            }
            fitness::assign_fitness(&mut neighbor, problem);

            if neighbor.fitness > current.fitness {
                current = neighbor;
                self.improvements += 1;
                no_improvement = 0;
            } else {
                no_improvement += 1;
                if no_improvement >= self.no_improvement_limit {
                    break;
                }
            }
        }

        current
    }

    fn risk_guided<R: Rng>(&mut self, start: Chromosome, problem: &Problem, rng: &mut R) -> Chromosome {
        let mut annealing = self.annealing;
        let mut best = start.clone();
        let mut current = start;
        let mut rejected = 0;

        for _ in 0..self.max_iterations {
            self.iterations += 1;

            let schedule = fitness::evaluate_with_schedule(&current, problem);
            let scores = self.risk_model.assess(&schedule, problem);
            let flagged = self.risk_model.flagged(&scores);
            if self.iterations == 1 {
                let (high, medium, low) = risk::level_counts(&scores);
                debug!("order risk: {} high, {} medium, {} low", high, medium, low);
            }

            let mut neighbor = current.clone();
            match Neighborhood::random(rng) {
                Neighborhood::SwapSlots => {
                    neighborhood::risk_swap_slots(&mut neighbor, problem, &flagged, rng)
                }
                Neighborhood::SwapPriority => {
                    neighborhood::risk_swap_priority(&mut neighbor, &flagged, rng)
                }
            }
            fitness::assign_fitness(&mut neighbor, problem);

            if annealing.accepts(neighbor.fitness, current.fitness, rng) {
                current = neighbor;
                rejected = 0;
                if current.fitness > best.fitness {
                    best = current.clone();
                    self.improvements += 1;
                }
            } else {
                rejected += 1;
            }

            annealing.cool();
            if rejected >= self.no_improvement_limit {
                break;
            }
        }

        best
    }
}
