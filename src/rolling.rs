//! Rolling-horizon re-planning: one optimization per simulated day, with
//! frozen past slots, irrevocable production commits and due-date penalties.

use crate::config::Config;
use crate::engine::run_ga;
use crate::error::ScheduleError;
use crate::fitness;
use crate::local_search::LocalSearch;
use crate::order::{Order, OrderPool};
use crate::problem::Problem;
use crate::schedule::{DemandBasis, Schedule};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Maximum divergence between total profit and the sum of daily profits.
pub const PROFIT_EPSILON: f64 = 0.01;

/// Executed financial results of one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayStats {
    /// 1-based day number
    pub day: u32,
    pub current_slot: u32,
    pub eligible_orders: usize,
    pub revenue: f64,
    pub cost: f64,
    pub penalty: f64,
    pub profit: f64,
    /// Orders finished so far, over all days
    pub completed_orders: usize,
    pub stoploss_triggered: bool,
}

/// Progress of one order at the end of a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderProgress {
    pub order_id: u32,
    pub product: u32,
    pub quantity: u32,
    pub produced_today: u32,
    pub cumulative_produced: u32,
    pub remaining: u32,
    /// Produced share of the order, in `[0, 1]`
    pub progress: f64,
    pub is_finished: bool,
    pub is_on_time: bool,
    pub due_slot: u32,
    pub unit_price: f64,
}

impl OrderProgress {
    fn snapshot(order: &Order, produced_today: u32, current_slot: u32) -> Self {
        let cumulative_produced = order.completed_quantity();
        let is_finished = order.is_completed();
        let is_on_time = match order.completed_slot {
            Some(slot) if is_finished => slot < order.due_slot,
            _ => current_slot < order.due_slot,
        };
        OrderProgress {
            order_id: order.order_id,
            product: order.product,
            quantity: order.quantity,
            produced_today,
            cumulative_produced,
            remaining: order.remaining,
            progress: if order.quantity > 0 {
                cumulative_produced as f64 / order.quantity as f64
            } else {
                0.0
            },
            is_finished,
            is_on_time,
            due_slot: order.due_slot,
            unit_price: order.unit_price,
        }
    }
}

/// Everything observed on one simulated day.
#[derive(Debug, Clone, Serialize)]
pub struct DayResult {
    pub stats: DayStats,
    /// Optimized window schedule, `None` on an idle day
    pub schedule: Option<Schedule>,
    pub orders: Vec<OrderProgress>,
}

/// Totals over all simulated days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeStatistics {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_penalty: f64,
    pub total_profit: f64,
    pub total_orders: usize,
    pub completed_orders: usize,
    pub on_time_orders: usize,
    pub on_time_rate: f64,
    pub daily: Vec<DayStats>,
}

/// Output of a multi-day simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub days: Vec<DayResult>,
    pub statistics: CumulativeStatistics,
    /// Global schedule after the last day
    pub final_schedule: Schedule,
}

impl SimulationResult {
    /// Day-by-day progress of one order as `(day, progress)` pairs.
    pub fn order_history(&self, order_id: u32) -> Vec<(u32, &OrderProgress)> {
        self.days
            .iter()
            .filter_map(|day| {
                day.orders
                    .iter()
                    .find(|o| o.order_id == order_id)
                    .map(|progress| (day.stats.day, progress))
            })
            .collect()
    }
}

/// Drives one optimization per day over a sliding planning window.
///
/// The scheduler is the only writer of its order pool and global schedule.
pub struct RollingScheduler {
    config: Config,
    pool: OrderPool,
    current_schedule: Schedule,
    frozen_slots: BTreeSet<u32>,
    daily: Vec<DayStats>,
    produced_today: BTreeMap<u32, u32>,
    rng: ChaCha8Rng,
}

impl RollingScheduler {
    /// Create a scheduler. The random source is seeded from `config.seed`
    /// when present and from entropy otherwise.
    pub fn new(config: Config, pool: OrderPool) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        RollingScheduler {
            config,
            pool,
            current_schedule: Schedule::new(),
            frozen_slots: BTreeSet::new(),
            daily: Vec::new(),
            produced_today: BTreeMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn order_pool(&self) -> &OrderPool {
        &self.pool
    }

    /// Global schedule: committed past slots plus the latest plan.
    pub fn current_schedule(&self) -> &Schedule {
        &self.current_schedule
    }

    pub fn frozen_slots(&self) -> &BTreeSet<u32> {
        &self.frozen_slots
    }

    pub fn daily_stats(&self) -> &[DayStats] {
        &self.daily
    }

    /// Quantity committed per order on the last processed day.
    pub fn produced_today(&self) -> &BTreeMap<u32, u32> {
        &self.produced_today
    }

    /// Plan, commit and settle one day (0-based). Returns the optimized window
    /// schedule, or `None` when no order was eligible.
    pub fn run_daily_schedule(&mut self, day: u32) -> Option<Schedule> {
        let current_slot = self.pool.time_to_slot(day, 8);
        let orders = self.pool.eligible_orders(current_slot);
        self.produced_today.clear();

        self.freeze_before(current_slot);

        if orders.is_empty() {
            info!("day {}: no eligible orders, idle", day + 1);
            self.drop_stale_plan(current_slot);
            self.daily.push(DayStats {
                day: day + 1,
                current_slot,
                completed_orders: self.completed_orders(),
                ..DayStats::default()
            });
            return None;
        }

        info!(
            "day {}: slot {}, {} eligible of {} pending orders, {} frozen slots",
            day + 1,
            current_slot,
            orders.len(),
            self.pool.pending_count(),
            self.frozen_slots.len()
        );

        let mut window_schedule = self.optimize(&orders, current_slot);

        let mut stoploss_triggered = false;
        if self.config.enable_stoploss {
            let estimate = self.estimate_day_profit(&window_schedule, day, current_slot);
            if estimate < 0.0 {
                warn!(
                    "day {}: estimated profit {:.2} is negative, idling today's slots",
                    day + 1,
                    estimate
                );
                let (first, last) = self.day_range(day);
                window_schedule
                    .allocation
                    .retain(|key, _| key.slot < first || key.slot > last);
                window_schedule.rebuild_completion();
                window_schedule.calculate_metrics(&orders, &self.config, DemandBasis::Remaining);
                stoploss_triggered = true;
            }
        }

        self.merge(&window_schedule, current_slot);

        let (revenue, cost) = self.commit_day(day);
        let penalty = self.penalize(current_slot);
        let profit = revenue - cost - penalty;

        let stats = DayStats {
            day: day + 1,
            current_slot,
            eligible_orders: orders.len(),
            revenue,
            cost,
            penalty,
            profit,
            completed_orders: self.completed_orders(),
            stoploss_triggered,
        };
        info!(
            "day {}: revenue {:.2}, cost {:.2}, penalty {:.2}, profit {:.2}, completed {}/{}",
            stats.day,
            revenue,
            cost,
            penalty,
            profit,
            stats.completed_orders,
            self.pool.len()
        );
        self.daily.push(stats);

        Some(window_schedule)
    }

    /// Run GA (or islands) followed by local search on the window anchored at
    /// `current_slot` and decode the result.
    fn optimize(&mut self, orders: &[Order], current_slot: u32) -> Schedule {
        let problem = Problem::with_horizon(&self.config, orders, current_slot);
        let best = run_ga(problem, &mut self.rng);
        let mut local_search = LocalSearch::new(&self.config);
        let improved = local_search.improve(&best, &problem, &mut self.rng);
        debug!(
            "window {}..={}: GA {:.2}, local search {:.2}",
            problem.start_slot,
            problem.end_slot(),
            best.fitness,
            improved.fitness
        );
        fitness::evaluate_with_schedule(&improved, &problem)
    }

    /// First and last global slot of a day.
    fn day_range(&self, day: u32) -> (u32, u32) {
        let slots_per_day = self.pool.slots_per_day();
        (day * slots_per_day + 1, (day + 1) * slots_per_day)
    }

    fn freeze_before(&mut self, current_slot: u32) {
        self.frozen_slots.extend(1..current_slot);
    }

    /// Remove every non-frozen entry at or after `current_slot`.
    fn drop_stale_plan(&mut self, current_slot: u32) {
        let frozen = &self.frozen_slots;
        self.current_schedule
            .allocation
            .retain(|key, _| key.slot < current_slot || frozen.contains(&key.slot));
    }

    /// Merge a window schedule into the global schedule. Frozen slots are
    /// never written; the previous plan for open slots is replaced.
    pub fn merge(&mut self, window: &Schedule, current_slot: u32) {
        self.drop_stale_plan(current_slot);
        for (key, &qty) in &window.allocation {
            if qty > 0 && !self.frozen_slots.contains(&key.slot) {
                self.current_schedule.allocation.insert(*key, qty);
            }
        }
        self.current_schedule.rebuild_completion();

        let all_orders: Vec<Order> = self.pool.orders().cloned().collect();
        self.current_schedule
            .calculate_metrics(&all_orders, &self.config, DemandBasis::Quantity);
    }

    /// Standalone profit of the planned day: revenue of today's allocations
    /// minus today's labor minus the penalties that would trigger today.
    fn estimate_day_profit(&self, window: &Schedule, day: u32, current_slot: u32) -> f64 {
        let (first, last) = self.day_range(day);
        let mut planned: BTreeMap<u32, u32> = BTreeMap::new();
        let mut working: BTreeSet<(u32, u32)> = BTreeSet::new();

        for (key, &qty) in &window.allocation {
            if qty > 0 && key.slot >= first && key.slot <= last {
                *planned.entry(key.order_id).or_insert(0) += qty;
                working.insert((key.line, key.slot));
            }
        }

        let revenue: f64 = planned
            .iter()
            .filter_map(|(id, &qty)| self.pool.get(*id).map(|o| qty.min(o.remaining) as f64 * o.unit_price))
            .sum();
        let cost: f64 = working.iter().map(|&(_, slot)| self.config.labor_cost(slot)).sum();
        let penalty: f64 = self
            .pool
            .orders()
            .filter(|o| o.due_slot <= current_slot && !o.penalized)
            .filter(|o| o.remaining > planned.get(&o.order_id).copied().unwrap_or(0))
            .map(|o| o.penalty_amount(self.config.penalty_rate))
            .sum();

        revenue - cost - penalty
    }

    /// Execute every slot of the day against the real order state and freeze
    /// it. Returns `(revenue, labor cost)` of what was produced.
    fn commit_day(&mut self, day: u32) -> (f64, f64) {
        let (first, last) = self.day_range(day);
        let entries = self.current_schedule.entries();

        let mut revenue = 0.0;
        let mut cost = 0.0;

        for slot in first..=last {
            let mut working_lines = BTreeSet::new();

            for entry in entries.iter().filter(|e| e.slot == slot && e.quantity > 0) {
                let Some(order) = self.pool.get_mut(entry.order_id) else {
                    continue;
                };
                let before = order.remaining;
                order.remaining = before.saturating_sub(entry.quantity);
                let produced = before - order.remaining;

                revenue += produced as f64 * order.unit_price;
                if order.remaining == 0 && before > 0 && order.completed_slot.is_none() {
                    order.completed_slot = Some(slot);
                    debug!("order {} completed in slot {}", order.order_id, slot);
                }
                *self.produced_today.entry(entry.order_id).or_insert(0) += produced;
                working_lines.insert(entry.line);
            }

            cost += self.config.labor_cost(slot) * working_lines.len() as f64;
            self.frozen_slots.insert(slot);
        }

        (revenue, cost)
    }

    /// Charge every overdue, unfinished, not yet penalized order once.
    fn penalize(&mut self, current_slot: u32) -> f64 {
        let penalty_rate = self.config.penalty_rate;
        let mut penalty = 0.0;
        for order in self.pool.orders_mut() {
            if order.due_slot <= current_slot && order.remaining > 0 && !order.penalized {
                let amount = order.penalty_amount(penalty_rate);
                warn!(
                    "order {} overdue (due slot {}), penalty {:.2}",
                    order.order_id, order.due_slot, amount
                );
                penalty += amount;
                order.penalized = true;
            }
        }
        penalty
    }

    fn completed_orders(&self) -> usize {
        self.pool.orders().filter(|o| o.is_completed()).count()
    }

    /// Progress snapshot of every order after the last processed day.
    pub fn order_progress(&self, current_slot: u32) -> Vec<OrderProgress> {
        self.pool
            .orders()
            .map(|o| {
                let produced = self.produced_today.get(&o.order_id).copied().unwrap_or(0);
                OrderProgress::snapshot(o, produced, current_slot)
            })
            .collect()
    }

    /// Totals over all processed days, cross-checked against the daily profits.
    pub fn cumulative_statistics(&self) -> Result<CumulativeStatistics, ScheduleError> {
        let total_revenue: f64 = self.daily.iter().map(|d| d.revenue).sum();
        let total_cost: f64 = self.daily.iter().map(|d| d.cost).sum();
        let total_penalty: f64 = self.daily.iter().map(|d| d.penalty).sum();
        let total_profit = total_revenue - total_cost - total_penalty;

        let profit_sum: f64 = self.daily.iter().map(|d| d.profit).sum();
        if (total_profit - profit_sum).abs() > PROFIT_EPSILON {
            return Err(ScheduleError::ProfitMismatch {
                total: total_profit,
                sum: profit_sum,
            });
        }

        let total_orders = self.pool.len();
        let completed_orders = self.completed_orders();
        let on_time_orders = self
            .pool
            .orders()
            .filter(|o| matches!(o.completed_slot, Some(slot) if o.is_completed() && slot < o.due_slot))
            .count();

        Ok(CumulativeStatistics {
            total_revenue,
            total_cost,
            total_penalty,
            total_profit,
            total_orders,
            completed_orders,
            on_time_orders,
            on_time_rate: if total_orders > 0 {
                on_time_orders as f64 / total_orders as f64
            } else {
                0.0
            },
            daily: self.daily.clone(),
        })
    }

    /// Run days `0..num_days` and collect per-day results.
    pub fn run_simulation(&mut self, num_days: u32) -> Result<SimulationResult, ScheduleError> {
        let mut days = Vec::with_capacity(num_days as usize);

        for day in 0..num_days {
            let schedule = self.run_daily_schedule(day);
            let stats = self.daily.last().cloned().unwrap_or_default();
            let orders = self.order_progress(stats.current_slot);
            days.push(DayResult {
                stats,
                schedule,
                orders,
            });
        }

        let statistics = self.cumulative_statistics()?;
        info!(
            "simulation of {} days: profit {:.2}, {}/{} orders completed",
            num_days, statistics.total_profit, statistics.completed_orders, statistics.total_orders
        );

        Ok(SimulationResult {
            days,
            statistics,
            final_schedule: self.current_schedule.clone(),
        })
    }
}
