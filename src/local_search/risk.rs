//! Per-order risk scoring used to direct the risk-guided local search.

use crate::config::Config;
use crate::problem::Problem;
use crate::schedule::Schedule;
use std::cmp::Ordering;
use std::fmt;

/// Number of orders flagged when none reaches the high threshold.
pub const FALLBACK_FLAGGED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        };
        f.write_str(name)
    }
}

/// Risk of one order under a decoded schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskScore {
    /// Index of the order in the window's order slice
    pub order_index: usize,
    pub order_id: u32,
    /// Potential penalty relative to the largest one in the window, in `[0, 1]`
    pub penalty_exposure: f64,
    /// Unserved share of the order, in `[0, 1]`
    pub demand_gap: f64,
    /// Closeness of the due slot to the window start, in `[0, 1]`
    pub urgency: f64,
    /// Weighted sum of the three components
    pub score: f64,
    pub level: RiskLevel,
}

/// Weights and thresholds of the risk model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskModel {
    pub weight_penalty: f64,
    pub weight_demand_gap: f64,
    pub weight_urgency: f64,
    pub threshold_high: f64,
    pub threshold_medium: f64,
}

impl RiskModel {
    pub fn from_config(config: &Config) -> Self {
        RiskModel {
            weight_penalty: config.risk_weight_penalty,
            weight_demand_gap: config.risk_weight_demand_gap,
            weight_urgency: config.risk_weight_urgency,
            threshold_high: config.risk_threshold_high,
            threshold_medium: config.risk_threshold_medium,
        }
    }

    pub fn level(&self, score: f64) -> RiskLevel {
        if score >= self.threshold_high {
            RiskLevel::High
        } else if score >= self.threshold_medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Score every order of the window against a decoded schedule.
    ///
    /// An order is exposed to its full penalty when the schedule leaves it
    /// short of its open demand; exposures are normalized by the window maximum.
    pub fn assess(&self, schedule: &Schedule, problem: &Problem) -> Vec<RiskScore> {
        let penalty_rate = problem.config.penalty_rate;
        let horizon = problem.num_slots as f64;

        let exposures: Vec<f64> = problem
            .orders
            .iter()
            .map(|order| {
                if schedule.completed_quantity(order.order_id) < order.remaining {
                    order.penalty_amount(penalty_rate)
                } else {
                    0.0
                }
            })
            .collect();
        let max_exposure = exposures.iter().cloned().fold(0.0, f64::max);

        problem
            .orders
            .iter()
            .zip(exposures)
            .enumerate()
            .map(|(order_index, (order, exposure))| {
                let penalty_exposure = if max_exposure > 0.0 {
                    exposure / max_exposure
                } else {
                    0.0
                };

                let completed = schedule.completed_quantity(order.order_id);
                let gap = order.remaining.saturating_sub(completed);
                let demand_gap = if order.quantity > 0 {
                    gap as f64 / order.quantity as f64
                } else {
                    0.0
                };

                let urgency = if horizon > 0.0 {
                    let time_left = (order.due_slot as f64 - problem.start_slot as f64).clamp(0.0, horizon);
                    1.0 - time_left / horizon
                } else {
                    1.0
                };

                let score = self.weight_penalty * penalty_exposure
                    + self.weight_demand_gap * demand_gap
                    + self.weight_urgency * urgency;

                RiskScore {
                    order_index,
                    order_id: order.order_id,
                    penalty_exposure,
                    demand_gap,
                    urgency,
                    score,
                    level: self.level(score),
                }
            })
            .collect()
    }

    /// Order indices to target: every high-risk order, or the
    /// [`FALLBACK_FLAGGED`] riskiest orders when none is high.
    pub fn flagged(&self, scores: &[RiskScore]) -> Vec<usize> {
        let high: Vec<usize> = scores
            .iter()
            .filter(|s| s.level == RiskLevel::High)
            .map(|s| s.order_index)
            .collect();
        if !high.is_empty() {
            return high;
        }

        let mut ranked: Vec<&RiskScore> = scores.iter().collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
            .into_iter()
            .take(FALLBACK_FLAGGED)
            .map(|s| s.order_index)
            .collect()
    }
}

/// Count of orders per risk level: `(high, medium, low)`.
pub fn level_counts(scores: &[RiskScore]) -> (usize, usize, usize) {
    scores.iter().fold((0, 0, 0), |(h, m, l), s| match s.level {
        RiskLevel::High => (h + 1, m, l),
        RiskLevel::Medium => (h, m + 1, l),
        RiskLevel::Low => (h, m, l + 1),
    })
}
