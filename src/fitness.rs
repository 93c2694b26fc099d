//! Fitness evaluation: profit of the decoded schedule.

use crate::chromosome::Chromosome;
use crate::decoder::Decoder;
use crate::problem::Problem;
use crate::schedule::{DemandBasis, Schedule};

/// Decode a chromosome and score it as `revenue - cost - penalty`.
///
/// The decode is a private throwaway; no order state is touched.
pub fn evaluate(chromosome: &Chromosome, problem: &Problem) -> f64 {
    evaluate_with_schedule(chromosome, problem).profit
}

/// Like [`evaluate`] but also returns the decoded schedule with its metrics.
///
/// The penalty is binary per order: any shortfall against the order's open
/// demand charges the full `quantity * unit_price * penalty_rate`.
pub fn evaluate_with_schedule(chromosome: &Chromosome, problem: &Problem) -> Schedule {
    let mut schedule = Decoder::decode(chromosome, problem);
    schedule.calculate_metrics(problem.orders, problem.config, DemandBasis::Remaining);
    schedule
}

/// Evaluate and store the fitness on the chromosome.
pub fn assign_fitness(chromosome: &mut Chromosome, problem: &Problem) {
    chromosome.fitness = evaluate(chromosome, problem);
}
