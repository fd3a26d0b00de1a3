//! Betti Numbers: Topological Invariants
//!
//! The k-th persistent Betti number βₖ(t) counts the k-dimensional classes
//! alive at filtration value t, i.e. the pairs with `birth <= t < death`:
//!
//! - β₀: weakly connected pieces
//! - β₁: directed cycles not yet filled
//! - β₂: 2-dimensional voids
//!
//! Read off a diagram, this is exact at every t.

use serde::{Deserialize, Serialize};

use super::Diagram;
use crate::FiltrationTime;

/// Betti numbers at a specific filtration value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BettiNumbers {
    pub beta_0: usize,
    pub beta_1: usize,
    pub beta_2: usize,
    pub time: FiltrationTime,
}

impl BettiNumbers {
    pub fn new(beta_0: usize, beta_1: usize, beta_2: usize, time: FiltrationTime) -> Self {
        Self {
            beta_0,
            beta_1,
            beta_2,
            time,
        }
    }

    /// Betti numbers of the sublevel complex at `time`
    pub fn at(diagram: &Diagram, time: FiltrationTime) -> Self {
        let alive = |d: usize| {
            diagram
                .dim(d)
                .iter()
                .filter(|p| p.birth <= time && p.death.map_or(true, |death| time < death))
                .count()
        };
        Self::new(alive(0), alive(1), alive(2), time)
    }

    /// Total topological complexity
    pub fn total(&self) -> usize {
        self.beta_0 + self.beta_1 + self.beta_2
    }

    /// Euler characteristic χ = β₀ - β₁ + β₂
    pub fn euler_characteristic(&self) -> i64 {
        self.beta_0 as i64 - self.beta_1 as i64 + self.beta_2 as i64
    }
}

/// Betti curve: Betti numbers sampled across the filtration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettiCurve {
    pub values: Vec<BettiNumbers>,
}

impl BettiCurve {
    /// Sample `steps + 1` evenly spaced values from `start` to `end`
    pub fn sample(
        diagram: &Diagram,
        start: FiltrationTime,
        end: FiltrationTime,
        steps: usize,
    ) -> Self {
        let values = if steps == 0 {
            vec![BettiNumbers::at(diagram, start)]
        } else {
            let step = (end - start) / steps as f64;
            (0..=steps)
                .map(|i| BettiNumbers::at(diagram, start + step * i as f64))
                .collect()
        };
        Self { values }
    }

    /// Get β₀ curve
    pub fn beta_0_curve(&self) -> Vec<(f64, usize)> {
        self.values.iter().map(|b| (b.time, b.beta_0)).collect()
    }

    /// Get β₁ curve
    pub fn beta_1_curve(&self) -> Vec<(f64, usize)> {
        self.values.iter().map(|b| (b.time, b.beta_1)).collect()
    }

    /// Integrated β₁ (trapezoidal area under the curve)
    pub fn integrated_beta_1(&self) -> f64 {
        self.values
            .windows(2)
            .map(|w| {
                let dt = w[1].time - w[0].time;
                dt * (w[0].beta_1 + w[1].beta_1) as f64 / 2.0
            })
            .sum()
    }
}
