//! Concrete production schedules and their financial metrics.

use crate::config::Config;
use crate::order::Order;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Identifies one allocation: an order served on a line (1-based) in a global slot (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationKey {
    pub order_id: u32,
    pub line: u32,
    pub slot: u32,
}

impl AllocationKey {
    pub fn new(order_id: u32, line: u32, slot: u32) -> Self {
        AllocationKey {
            order_id,
            line,
            slot,
        }
    }
}

/// What an order's delivered quantity is compared against when charging the
/// per-evaluation penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandBasis {
    /// The schedule covers the whole order: short if `completed < quantity`.
    Quantity,
    /// The schedule covers what is still open: short if `completed < remaining`.
    Remaining,
}

/// A production schedule: `(order, line, slot) -> quantity` plus derived totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Positive allocations only
    #[serde(with = "allocation_entries")]
    pub allocation: HashMap<AllocationKey, u32>,
    /// Total quantity allocated per order
    pub order_completion: HashMap<u32, u32>,
    pub revenue: f64,
    pub cost: f64,
    pub penalty: f64,
    pub profit: f64,
}

impl Schedule {
    /// Create a new, empty schedule.
    pub fn new() -> Self {
        Schedule::default()
    }

    /// Record an allocation. Non-positive quantities are ignored.
    pub fn add_allocation(&mut self, order_id: u32, line: u32, slot: u32, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self
            .allocation
            .entry(AllocationKey::new(order_id, line, slot))
            .or_insert(0) += quantity;
        *self.order_completion.entry(order_id).or_insert(0) += quantity;
    }

    /// Recompute `order_completion` from the allocation map.
    pub fn rebuild_completion(&mut self) {
        self.order_completion.clear();
        for (key, &qty) in &self.allocation {
            if qty > 0 {
                *self.order_completion.entry(key.order_id).or_insert(0) += qty;
            }
        }
    }

    /// Distinct `(line, slot)` pairs with at least one positive allocation, sorted.
    pub fn working_line_slots(&self) -> BTreeSet<(u32, u32)> {
        self.allocation
            .iter()
            .filter(|&(_, &qty)| qty > 0)
            .map(|(key, _)| (key.line, key.slot))
            .collect()
    }

    /// Compute revenue, labor cost, penalty and profit.
    ///
    /// Revenue counts only orders present in `orders`. Labor cost is charged per
    /// working line-slot. Every order short of its demand basis pays the flat
    /// penalty `quantity * unit_price * penalty_rate`.
    pub fn calculate_metrics(&mut self, orders: &[Order], config: &Config, basis: DemandBasis) {
        self.revenue = 0.0;
        self.cost = 0.0;
        self.penalty = 0.0;

        for order in orders {
            let completed = self.completed_quantity(order.order_id);
            self.revenue += completed as f64 * order.unit_price;

            let demand = match basis {
                DemandBasis::Quantity => order.quantity,
                DemandBasis::Remaining => order.remaining,
            };
            if completed < demand {
                self.penalty += order.penalty_amount(config.penalty_rate);
            }
        }

        for (_, slot) in self.working_line_slots() {
            self.cost += config.labor_cost(slot);
        }

        self.profit = self.revenue - self.cost - self.penalty;
    }

    pub fn completed_quantity(&self, order_id: u32) -> u32 {
        self.order_completion.get(&order_id).copied().unwrap_or(0)
    }

    /// Allocations of one line, grouped by slot: `slot -> [(order_id, quantity)]`.
    pub fn line_schedule(&self, line: u32) -> BTreeMap<u32, Vec<(u32, u32)>> {
        let mut by_slot: BTreeMap<u32, Vec<(u32, u32)>> = BTreeMap::new();
        for (key, &qty) in &self.allocation {
            if key.line == line && qty > 0 {
                by_slot.entry(key.slot).or_default().push((key.order_id, qty));
            }
        }
        for entries in by_slot.values_mut() {
            entries.sort_unstable();
        }
        by_slot
    }

    /// Product made on `line` in `slot`, 0 when idle.
    pub fn slot_product(&self, line: u32, slot: u32, orders: &[Order]) -> u32 {
        self.allocation
            .iter()
            .filter(|&(key, &qty)| key.line == line && key.slot == slot && qty > 0)
            .find_map(|(key, _)| orders.iter().find(|o| o.order_id == key.order_id))
            .map(|o| o.product)
            .unwrap_or(0)
    }

    /// `(completed quantity, fully covered)` for an order.
    pub fn completion_status(&self, order: &Order) -> (u32, bool) {
        let completed = self.completed_quantity(order.order_id);
        (completed, completed >= order.quantity)
    }

    /// Summary statistics over the given orders.
    pub fn statistics(&self, orders: &[Order]) -> ScheduleStatistics {
        let total_orders = orders.len();
        let mut completed_orders = 0;
        let mut completion_rate_sum = 0.0;

        for order in orders {
            let (completed, done) = self.completion_status(order);
            if done {
                completed_orders += 1;
            }
            if order.quantity > 0 {
                completion_rate_sum += completed as f64 / order.quantity as f64;
            }
        }

        let ratio = |x: f64| if total_orders > 0 { x / total_orders as f64 } else { 0.0 };

        ScheduleStatistics {
            total_orders,
            completed_orders,
            on_time_rate: ratio(completed_orders as f64),
            avg_completion_rate: ratio(completion_rate_sum),
            total_working_slots: self.working_line_slots().len(),
            revenue: self.revenue,
            cost: self.cost,
            penalty: self.penalty,
            profit: self.profit,
        }
    }

    /// Allocations sorted by `(slot, line, order_id)`.
    pub fn entries(&self) -> Vec<AllocationEntry> {
        allocation_entries::sorted(&self.allocation)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Schedule(profit={:.2}, revenue={:.2}, cost={:.2}, penalty={:.2})",
            self.profit, self.revenue, self.cost, self.penalty
        )
    }
}

/// Aggregate view of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleStatistics {
    pub total_orders: usize,
    pub completed_orders: usize,
    pub on_time_rate: f64,
    pub avg_completion_rate: f64,
    pub total_working_slots: usize,
    pub revenue: f64,
    pub cost: f64,
    pub penalty: f64,
    pub profit: f64,
}

/// Flat form of one allocation, used for serialization and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub order_id: u32,
    pub line: u32,
    pub slot: u32,
    pub quantity: u32,
}

/// Serializes the allocation map as a sorted entry list; JSON objects cannot
/// carry struct keys.
mod allocation_entries {
    use super::{AllocationEntry, AllocationKey};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub(super) fn sorted(map: &HashMap<AllocationKey, u32>) -> Vec<AllocationEntry> {
        let mut entries: Vec<AllocationEntry> = map
            .iter()
            .map(|(key, &quantity)| AllocationEntry {
                order_id: key.order_id,
                line: key.line,
                slot: key.slot,
                quantity,
            })
            .collect();
        entries.sort_by_key(|e| (e.slot, e.line, e.order_id));
        entries
    }

    pub fn serialize<S: Serializer>(
        map: &HashMap<AllocationKey, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        sorted(map).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<AllocationKey, u32>, D::Error> {
        let entries = Vec::<AllocationEntry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (AllocationKey::new(e.order_id, e.line, e.slot), e.quantity))
            .collect())
    }
}
