//! Decoder turning a chromosome into a concrete capacity assignment.

use crate::chromosome::Chromosome;
use crate::problem::Problem;
use crate::schedule::Schedule;
use itertools::Itertools;
use std::collections::HashMap;

/// Identifies the capacity of one product on a line (1-based) in a global slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapacityKey {
    pub line: u32,
    pub slot: u32,
    pub product: u32,
}

/// Units still available per `(line, slot, product)` during one decode.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    units: HashMap<CapacityKey, u32>,
    /// Per product, the `(slot, line)` cells producing it, earliest first
    cells: HashMap<u32, Vec<(u32, u32)>>,
}

impl CapacityLedger {
    /// Build the ledger from a capacity gene laid out as `line_idx * num_slots + slot_idx`.
    pub fn from_gene(gene_capacity: &[u32], problem: &Problem) -> Self {
        let mut ledger = CapacityLedger::default();
        let num_lines = problem.num_lines();
        if num_lines == 0 {
            return ledger;
        }
        let num_slots = gene_capacity.len() / num_lines;

        for line_idx in 0..num_lines {
            for slot_idx in 0..num_slots {
                let product = gene_capacity[line_idx * num_slots + slot_idx];
                if product == 0 {
                    continue;
                }
                let key = CapacityKey {
                    line: line_idx as u32 + 1,
                    slot: problem.global_slot(slot_idx),
                    product,
                };
                ledger
                    .units
                    .insert(key, problem.config.throughput_of(product));
            }
        }

        ledger.cells = ledger
            .units
            .keys()
            .map(|key| (key.product, (key.slot, key.line)))
            .into_group_map();
        for cells in ledger.cells.values_mut() {
            cells.sort_unstable();
        }
        ledger
    }

    /// Units of `product` left on `line` in `slot`.
    pub fn available(&self, line: u32, slot: u32, product: u32) -> u32 {
        self.units
            .get(&CapacityKey {
                line,
                slot,
                product,
            })
            .copied()
            .unwrap_or(0)
    }

    /// Cells with positive remaining capacity for `product`, as `(slot, line)`
    /// sorted by slot then line.
    pub fn candidates(&self, product: u32) -> Vec<(u32, u32)> {
        self.cells
            .get(&product)
            .map(|cells| {
                cells
                    .iter()
                    .copied()
                    .filter(|&(slot, line)| self.available(line, slot, product) > 0)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn consume(&mut self, line: u32, slot: u32, product: u32, amount: u32) {
        if let Some(units) = self.units.get_mut(&CapacityKey {
            line,
            slot,
            product,
        }) {
            *units = units.saturating_sub(amount);
        }
    }

    /// Total units still available across all cells.
    pub fn total_available(&self) -> u64 {
        self.units.values().map(|&u| u as u64).sum()
    }
}

/// Deterministic decoder from chromosome to schedule.
pub struct Decoder;

impl Decoder {
    /// Decode a chromosome against the window's orders.
    ///
    /// Orders are served in `gene_priority` order; each takes capacity of its
    /// product greedily from the earliest slot (ties by line) until its open
    /// demand is met. Due dates do not restrict allocation. Out-of-range
    /// priority entries are skipped.
    pub fn decode(chromosome: &Chromosome, problem: &Problem) -> Schedule {
        let mut schedule = Schedule::new();
        let mut ledger = CapacityLedger::from_gene(&chromosome.gene_capacity, problem);

        for &order_idx in &chromosome.gene_priority {
            let Some(order) = problem.orders.get(order_idx) else {
                continue;
            };

            let mut remaining_demand = order.remaining;
            if remaining_demand == 0 {
                continue;
            }

            for (slot, line) in ledger.candidates(order.product) {
                if remaining_demand == 0 {
                    break;
                }
                let allocate = ledger.available(line, slot, order.product).min(remaining_demand);
                schedule.add_allocation(order.order_id, line, slot, allocate);
                ledger.consume(line, slot, order.product, allocate);
                remaining_demand -= allocate;
            }
        }

        schedule
    }
}
