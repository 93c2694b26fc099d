//! Orders and the order pool consumed by the rolling scheduler.

use crate::error::OrderError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A customer order for a single product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u32,
    pub product: u32,
    pub quantity: u32,
    pub unit_price: f64,
    /// First slot in which the order may be scheduled (1-based)
    pub release_slot: u32,
    /// Slot at which the order becomes overdue (1-based)
    pub due_slot: u32,
    /// Units still to be produced
    pub remaining: u32,
    /// Whether the late-delivery penalty has already been charged
    pub penalized: bool,
    /// Slot in which the last unit was produced
    pub completed_slot: Option<u32>,
}

impl Order {
    /// Create a new order with its full quantity outstanding.
    pub fn new(
        order_id: u32,
        product: u32,
        quantity: u32,
        release_slot: u32,
        due_slot: u32,
        unit_price: f64,
    ) -> Self {
        Order {
            order_id,
            product,
            quantity,
            unit_price,
            release_slot,
            due_slot,
            remaining: quantity,
            penalized: false,
            completed_slot: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.remaining == 0
    }

    /// Units already delivered.
    pub fn completed_quantity(&self) -> u32 {
        self.quantity - self.remaining
    }

    /// Value of the whole order.
    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Flat late-delivery charge for this order.
    pub fn penalty_amount(&self, penalty_rate: f64) -> f64 {
        self.total_value() * penalty_rate
    }

    /// Restore the freshly loaded state.
    pub fn reset(&mut self) {
        self.remaining = self.quantity;
        self.penalized = false;
        self.completed_slot = None;
    }
}

/// One row of an order CSV file.
#[derive(Debug, Deserialize)]
struct OrderRecord {
    order_id: u32,
    product: u32,
    quantity: u32,
    #[serde(default = "default_release_slot")]
    release_slot: u32,
    due_slot: u32,
    unit_price: f64,
}

fn default_release_slot() -> u32 {
    1
}

/// Stores all known orders, keyed and iterated by id.
#[derive(Debug, Clone, Default)]
pub struct OrderPool {
    orders: BTreeMap<u32, Order>,
    slots_per_day: u32,
}

impl OrderPool {
    /// Create an empty pool for a day partitioned into `slots_per_day` slots.
    pub fn new(slots_per_day: u32) -> Self {
        OrderPool {
            orders: BTreeMap::new(),
            slots_per_day: slots_per_day.max(1),
        }
    }

    /// Create a pool from a list of orders.
    pub fn with_orders(slots_per_day: u32, orders: impl IntoIterator<Item = Order>) -> Self {
        let mut pool = OrderPool::new(slots_per_day);
        for order in orders {
            pool.add_order(order);
        }
        pool
    }

    /// Load orders from a CSV file with the header
    /// `order_id,product,quantity[,release_slot],due_slot,unit_price`.
    ///
    /// With `adjust_due_slot`, every due slot is moved to the first slot of the
    /// following day, so an order is due at the start of the day after its deadline.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        slots_per_day: u32,
        adjust_due_slot: bool,
    ) -> Result<Self, OrderError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let mut pool = OrderPool::new(slots_per_day);

        for record in reader.deserialize() {
            let record: OrderRecord = record?;
            if record.quantity == 0 {
                return Err(OrderError::Invalid {
                    order_id: record.order_id,
                    reason: "quantity must be positive".to_string(),
                });
            }
            if record.due_slot == 0 || record.release_slot == 0 {
                return Err(OrderError::Invalid {
                    order_id: record.order_id,
                    reason: "slots are 1-based".to_string(),
                });
            }

            let due_slot = if adjust_due_slot {
                pool.next_day_start(record.due_slot)
            } else {
                record.due_slot
            };

            pool.add_order(Order::new(
                record.order_id,
                record.product,
                record.quantity,
                record.release_slot,
                due_slot,
                record.unit_price,
            ));
        }

        Ok(pool)
    }

    fn next_day_start(&self, slot: u32) -> u32 {
        let day = (slot - 1) / self.slots_per_day;
        (day + 1) * self.slots_per_day + 1
    }

    /// Insert or replace an order.
    pub fn add_order(&mut self, order: Order) {
        self.orders.insert(order.order_id, order);
    }

    pub fn get(&self, order_id: u32) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    pub fn get_mut(&mut self, order_id: u32) -> Option<&mut Order> {
        self.orders.get_mut(&order_id)
    }

    /// All orders in id order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub(crate) fn orders_mut(&mut self) -> impl Iterator<Item = &mut Order> {
        self.orders.values_mut()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Snapshots of the orders that can be planned at `current_slot`:
    /// released and not yet completed.
    pub fn eligible_orders(&self, current_slot: u32) -> Vec<Order> {
        self.orders
            .values()
            .filter(|o| o.remaining > 0 && o.release_slot <= current_slot)
            .cloned()
            .collect()
    }

    /// Number of orders with outstanding quantity.
    pub fn pending_count(&self) -> usize {
        self.orders.values().filter(|o| !o.is_completed()).count()
    }

    /// Restore every order to its freshly loaded state.
    pub fn reset(&mut self) {
        for order in self.orders.values_mut() {
            order.reset();
        }
    }

    pub fn slots_per_day(&self) -> u32 {
        self.slots_per_day
    }

    /// Map a 0-based day and an hour of the day to a 1-based global slot.
    ///
    /// Days start at 8am: hour 8 maps to the first slot of the day and the
    /// hours after midnight belong to the tail of the same day.
    pub fn time_to_slot(&self, day: u32, hour: u32) -> u32 {
        let hours_per_slot = (24 / self.slots_per_day).max(1);
        let offset = (hour as i64 - 8).rem_euclid(24) as u32;
        day * self.slots_per_day + offset / hours_per_slot + 1
    }
}
