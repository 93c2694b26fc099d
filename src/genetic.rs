//! Genetic operators: selection, crossover and mutation.

use crate::chromosome::Chromosome;
use rand::{seq::index, Rng};
use std::collections::HashSet;

/// Implements the genetic operators on the two-part encoding.
pub struct Genetic;

impl Genetic {
    /// Tournament selection: sample `k` distinct individuals (capped at the
    /// population size) and return the fittest. Ties go to the earliest sampled.
    pub fn tournament<'a, R: Rng>(
        population: &'a [Chromosome],
        k: usize,
        rng: &mut R,
    ) -> Option<&'a Chromosome> {
        if population.is_empty() {
            return None;
        }
        let k = k.clamp(1, population.len());

        let mut best: Option<&Chromosome> = None;
        for idx in index::sample(rng, population.len(), k).into_iter() {
            let candidate = &population[idx];
            if best.map_or(true, |b| candidate.fitness > b.fitness) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Single-point crossover of the capacity gene. The cut lies strictly inside
    /// the gene; the children swap tails.
    pub fn crossover_capacity<R: Rng>(
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> (Vec<u32>, Vec<u32>) {
        let p1 = &parent1.gene_capacity;
        let p2 = &parent2.gene_capacity;
        let length = p1.len();

        if length < 2 || length != p2.len() {
            return (p1.clone(), p2.clone());
        }

        let cut = rng.gen_range(1..length);

        let mut child1 = Vec::with_capacity(length);
        child1.extend_from_slice(&p1[..cut]);
        child1.extend_from_slice(&p2[cut..]);

        let mut child2 = Vec::with_capacity(length);
        child2.extend_from_slice(&p2[..cut]);
        child2.extend_from_slice(&p1[cut..]);

        (child1, child2)
    }

    /// Ordered crossover (OX) of the priority gene, producing two children.
    ///
    /// Each child keeps a contiguous slice of one parent in place and fills the
    /// other positions, starting after the slice and wrapping around, with the
    /// missing values in the order they appear in the other parent.
    pub fn crossover_priority<R: Rng>(
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        let p1 = &parent1.gene_priority;
        let p2 = &parent2.gene_priority;
        let length = p1.len();

        if length < 2 || length != p2.len() {
            return (p1.clone(), p2.clone());
        }

        // Determine cutting points for OX
        let cut1 = rng.gen_range(0..length);
        let cut2 = rng.gen_range(0..length);
        let (start, end) = if cut1 <= cut2 {
            (cut1, cut2)
        } else {
            (cut2, cut1)
        };

        (
            Self::order_crossover(p1, p2, start, end),
            Self::order_crossover(p2, p1, start, end),
        )
    }

    /// OX child keeping `donor[start..=end]` and filling from `filler`.
    pub fn order_crossover(donor: &[usize], filler: &[usize], start: usize, end: usize) -> Vec<usize> {
        let length = donor.len();
        let mut child = vec![0; length];

        // Copy segment from the donor
        child[start..=end].copy_from_slice(&donor[start..=end]);
        let mut used: HashSet<usize> = donor[start..=end].iter().copied().collect();

        // Fill remaining positions from the other parent
        let mut pos = (end + 1) % length;
        for offset in 1..=length {
            let gene = filler[(end + offset) % length];
            if used.insert(gene) {
                child[pos] = gene;
                pos = (pos + 1) % length;
            }
        }

        child
    }

    /// Per-position mutation of the capacity gene to a uniform value in `0..=num_products`.
    pub fn mutate_capacity<R: Rng>(
        chromosome: &mut Chromosome,
        mutation_rate: f64,
        num_products: u32,
        rng: &mut R,
    ) {
        for gene in chromosome.gene_capacity.iter_mut() {
            if rng.gen::<f64>() < mutation_rate {
                *gene = rng.gen_range(0..=num_products);
            }
        }
    }

    /// With probability `mutation_rate`, swap two random positions of the priority gene.
    pub fn mutate_priority<R: Rng>(chromosome: &mut Chromosome, mutation_rate: f64, rng: &mut R) {
        let length = chromosome.gene_priority.len();
        if length < 2 {
            return;
        }
        if rng.gen::<f64>() < mutation_rate {
            let i = rng.gen_range(0..length);
            let j = rng.gen_range(0..length);
            chromosome.gene_priority.swap(i, j);
        }
    }

    /// Recombine two parents into two children (fitness reset to 0).
    pub fn crossover<R: Rng>(
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        let (cap1, cap2) = Self::crossover_capacity(parent1, parent2, rng);
        let (pri1, pri2) = Self::crossover_priority(parent1, parent2, rng);
        (Chromosome::new(cap1, pri1), Chromosome::new(cap2, pri2))
    }

    /// Apply both mutations.
    pub fn mutate<R: Rng>(
        chromosome: &mut Chromosome,
        mutation_rate: f64,
        num_products: u32,
        rng: &mut R,
    ) {
        Self::mutate_capacity(chromosome, mutation_rate, num_products, rng);
        Self::mutate_priority(chromosome, mutation_rate, rng);
    }
}
