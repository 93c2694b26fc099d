//! Two-part solution encoding used by the genetic search.

use crate::problem::Problem;
use rand::{seq::SliceRandom, Rng};
use std::cmp::Ordering;

/// A candidate production plan for one window.
///
/// `gene_capacity[line_idx * num_slots + slot_idx]` is the product a line
/// makes in a slot (0 = idle). `gene_priority` is a permutation of order
/// indices giving the order in which demand is served during decoding.
#[derive(Debug, Clone, Default)]
pub struct Chromosome {
    pub gene_capacity: Vec<u32>,
    pub gene_priority: Vec<usize>,
    /// Profit of the decoded schedule, set by evaluation
    pub fitness: f64,
}

impl Chromosome {
    /// Create a chromosome from its two genes.
    pub fn new(gene_capacity: Vec<u32>, gene_priority: Vec<usize>) -> Self {
        Chromosome {
            gene_capacity,
            gene_priority,
            fitness: 0.0,
        }
    }

    /// Random capacity gene with the given priority gene.
    pub fn with_priority<R: Rng>(problem: &Problem, gene_priority: Vec<usize>, rng: &mut R) -> Self {
        let num_products = problem.config.num_products;
        let gene_capacity = (0..problem.capacity_gene_len())
            .map(|_| rng.gen_range(0..=num_products))
            .collect();
        Chromosome::new(gene_capacity, gene_priority)
    }

    /// Fully random chromosome: random capacity gene and a shuffled priority gene.
    pub fn random<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let mut chromosome = Self::with_priority(problem, (0..problem.num_orders()).collect(), rng);
        chromosome.gene_priority.shuffle(rng);
        chromosome
    }

    /// Random capacity gene with an earliest-due-date priority gene.
    pub fn earliest_due_date<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        Self::with_priority(problem, problem.edd_priority(), rng)
    }

    /// Whether `gene_priority` is a permutation of `0..num_orders`.
    pub fn is_permutation(&self, num_orders: usize) -> bool {
        if self.gene_priority.len() != num_orders {
            return false;
        }
        let mut seen = vec![false; num_orders];
        for &idx in &self.gene_priority {
            if idx >= num_orders || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }

    /// Structural validity check against the window dimensions.
    pub fn is_valid(
        &self,
        num_lines: usize,
        num_slots: usize,
        num_products: u32,
        num_orders: usize,
    ) -> bool {
        self.gene_capacity.len() == num_lines * num_slots
            && self.gene_capacity.iter().all(|&p| p <= num_products)
            && self.is_permutation(num_orders)
    }

    /// Product assigned to a line (0-based) in a window slot (0-based).
    pub fn product_at(&self, line_idx: usize, slot_idx: usize, num_slots: usize) -> u32 {
        self.gene_capacity
            .get(line_idx * num_slots + slot_idx)
            .copied()
            .unwrap_or(0)
    }

    /// Human-readable view of the encoding.
    pub fn render(&self, num_lines: usize, num_slots: usize) -> String {
        let mut out = format!("Chromosome (fitness={:.2})\n", self.fitness);

        if num_lines * num_slots == self.gene_capacity.len() && num_slots > 0 {
            for (line_idx, row) in self.gene_capacity.chunks(num_slots).enumerate() {
                let cells: Vec<String> = row
                    .iter()
                    .map(|&p| match p {
                        0 => "-".to_string(),
                        p => format!("P{}", p),
                    })
                    .collect();
                out.push_str(&format!("  Line {}: {}\n", line_idx + 1, cells.join(" ")));
            }
        } else {
            out.push_str(&format!("  {:?}\n", self.gene_capacity));
        }

        if self.gene_priority.len() <= 20 {
            out.push_str(&format!("  Priority: {:?}\n", self.gene_priority));
        } else {
            let n = self.gene_priority.len();
            out.push_str(&format!(
                "  Priority: {:?} ... {:?} (total: {})\n",
                &self.gene_priority[..10],
                &self.gene_priority[n - 10..],
                n
            ));
        }
        out
    }
}

/// Descending-fitness ordering, suitable for `sort_by`.
pub fn by_fitness_desc(a: &Chromosome, b: &Chromosome) -> Ordering {
    b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal)
}
