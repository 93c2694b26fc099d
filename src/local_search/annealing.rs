//! Controlled acceptance of worsening moves.

use crate::config::Config;
use rand::Rng;

/// Acceptance probability that decays geometrically down to a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annealing {
    accept_prob: f64,
    decay_rate: f64,
    min_accept_prob: f64,
}

impl Annealing {
    pub fn new(init_accept_prob: f64, decay_rate: f64, min_accept_prob: f64) -> Self {
        Annealing {
            accept_prob: init_accept_prob.clamp(0.0, 1.0),
            decay_rate,
            min_accept_prob: min_accept_prob.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.annealing_init_accept_prob,
            config.annealing_decay_rate,
            config.annealing_min_accept_prob,
        )
    }

    /// Current probability of accepting a worse candidate.
    pub fn accept_prob(&self) -> f64 {
        self.accept_prob
    }

    /// Improving or equal candidates are always accepted; worse ones with the
    /// current acceptance probability.
    pub fn accepts<R: Rng>(&self, candidate: f64, current: f64, rng: &mut R) -> bool {
        if candidate >= current {
            return true;
        }
        rng.gen::<f64>() < self.accept_prob
    }

    /// Decay the acceptance probability by one step.
    pub fn cool(&mut self) {
        self.accept_prob = (self.accept_prob * self.decay_rate).max(self.min_accept_prob);
    }
}
