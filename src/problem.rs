//! A single planning window handed to the search engines.

use crate::config::Config;
use crate::order::Order;

/// Everything one GA / local-search run needs: the configuration, the orders
/// that may be planned, and the slot range being optimized.
///
/// The orders are read-only snapshots; searches never touch the order pool.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    pub config: &'a Config,
    pub orders: &'a [Order],
    /// First global slot of the window (1-based)
    pub start_slot: u32,
    /// Number of slots in the window
    pub num_slots: usize,
}

impl<'a> Problem<'a> {
    /// Create a window of `num_slots` slots starting at `start_slot`.
    pub fn new(config: &'a Config, orders: &'a [Order], start_slot: u32, num_slots: usize) -> Self {
        Problem {
            config,
            orders,
            start_slot,
            num_slots,
        }
    }

    /// Create a window sized by the configured planning horizon.
    pub fn with_horizon(config: &'a Config, orders: &'a [Order], start_slot: u32) -> Self {
        Self::new(config, orders, start_slot, config.planning_horizon_slots())
    }

    pub fn num_lines(&self) -> usize {
        self.config.num_lines as usize
    }

    pub fn num_orders(&self) -> usize {
        self.orders.len()
    }

    /// Length of the capacity gene.
    pub fn capacity_gene_len(&self) -> usize {
        self.num_lines() * self.num_slots
    }

    /// Global slot of a window-relative slot index.
    pub fn global_slot(&self, slot_idx: usize) -> u32 {
        self.start_slot + slot_idx as u32
    }

    /// Last global slot covered by the window.
    pub fn end_slot(&self) -> u32 {
        self.start_slot + self.num_slots.saturating_sub(1) as u32
    }

    /// Order indices sorted by ascending due slot (earliest due date first).
    /// Ties keep their input order.
    pub fn edd_priority(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.orders.len()).collect();
        indices.sort_by_key(|&i| self.orders[i].due_slot);
        indices
    }
}
