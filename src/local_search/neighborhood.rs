//! Neighborhood moves on the two-part encoding.
//!
//! N1 swaps the products of two slots on one line of the capacity gene.
//! N2 swaps two positions of the priority gene.

use crate::chromosome::Chromosome;
use crate::problem::Problem;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// The two neighborhood structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// Swap two slot assignments within one line
    SwapSlots,
    /// Swap two positions of the priority sequence
    SwapPriority,
}

impl Neighborhood {
    /// Pick one of the two neighborhoods uniformly.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Neighborhood::SwapSlots
        } else {
            Neighborhood::SwapPriority
        }
    }
}

/// N1: pick a random line and two random slots on it and swap their products.
pub fn swap_slots<R: Rng>(chromosome: &mut Chromosome, num_lines: usize, rng: &mut R) {
    if num_lines == 0 || chromosome.gene_capacity.len() < 2 {
        return;
    }
    let num_slots = chromosome.gene_capacity.len() / num_lines;
    if num_slots == 0 {
        return;
    }

    let line_idx = rng.gen_range(0..num_lines);
    let slot1 = rng.gen_range(0..num_slots);
    let slot2 = rng.gen_range(0..num_slots);

    chromosome
        .gene_capacity
        .swap(line_idx * num_slots + slot1, line_idx * num_slots + slot2);
}

/// N2: swap two random positions of the priority gene.
pub fn swap_priority<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    let length = chromosome.gene_priority.len();
    if length < 2 {
        return;
    }
    let i = rng.gen_range(0..length);
    let j = rng.gen_range(0..length);
    chromosome.gene_priority.swap(i, j);
}

/// Capacity gene positions whose product matches a flagged order and whose
/// global slot lies in that order's `[release_slot, due_slot)` window.
pub fn risk_cells(chromosome: &Chromosome, problem: &Problem, flagged: &[usize]) -> Vec<usize> {
    let num_slots = problem.num_slots;
    if num_slots == 0 {
        return Vec::new();
    }

    let mut cells = Vec::new();
    for (pos, &product) in chromosome.gene_capacity.iter().enumerate() {
        if product == 0 {
            continue;
        }
        let slot = problem.global_slot(pos % num_slots);
        let matches = flagged
            .iter()
            .filter_map(|&idx| problem.orders.get(idx))
            .any(|o| o.product == product && o.release_slot <= slot && slot < o.due_slot);
        if matches {
            cells.push(pos);
        }
    }
    cells
}

/// Risk-directed N1: swap a cell serving a flagged order with a random cell
/// on the same line. Falls back to [`swap_slots`] when no cell qualifies.
pub fn risk_swap_slots<R: Rng>(
    chromosome: &mut Chromosome,
    problem: &Problem,
    flagged: &[usize],
    rng: &mut R,
) {
    let num_slots = problem.num_slots;
    let cells = risk_cells(chromosome, problem, flagged);

    let Some(&pos) = cells.choose(rng) else {
        swap_slots(chromosome, problem.num_lines(), rng);
        return;
    };

    let line_start = (pos / num_slots) * num_slots;
    let partner = line_start + rng.gen_range(0..num_slots);
    chromosome.gene_capacity.swap(pos, partner);
}

/// Risk-directed N2: move a flagged order one swap toward the front of the
/// priority sequence. Falls back to [`swap_priority`] when no flagged order
/// sits behind position 0.
pub fn risk_swap_priority<R: Rng>(chromosome: &mut Chromosome, flagged: &[usize], rng: &mut R) {
    let flagged: HashSet<usize> = flagged.iter().copied().collect();
    let positions: Vec<usize> = chromosome
        .gene_priority
        .iter()
        .enumerate()
        .filter(|&(pos, idx)| pos > 0 && flagged.contains(idx))
        .map(|(pos, _)| pos)
        .collect();

    let Some(&pos) = positions.choose(rng) else {
        swap_priority(chromosome, rng);
        return;
    };

    let earlier = rng.gen_range(0..pos);
    chromosome.gene_priority.swap(pos, earlier);
}
