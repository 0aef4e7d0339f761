// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Summary statistics over per-trial yields.
//!
//! [`summarize`] works on the full sample (it needs every yield for the
//! percentile bounds). [`YieldAccumulator`] keeps streaming moments that can
//! be merged across workers (Chan et al. pairwise update), for callers that
//! fan trials out themselves and only need mean / variance / extremes.

use serde::{Deserialize, Serialize};

use crate::types::SimulationSummary;

// ---------------------------------------------------------------------------
// Batch summary
// ---------------------------------------------------------------------------

/// Summarize a non-empty yield sample. Returns `None` for an empty slice.
pub fn summarize(yields: &[f64], expected_yield: f64) -> Option<SimulationSummary> {
    if yields.is_empty() {
        return None;
    }
    let n = yields.len() as f64;
    let min = yields.iter().copied().fold(f64::INFINITY, f64::min);
    let max = yields.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (mean, std_dev) = if min == max {
        // constant sample: keep rounding noise out of the dispersion
        (min, 0.0)
    } else {
        let mean = yields.iter().sum::<f64>() / n;
        let variance = yields.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    };
    let successes = yields.iter().filter(|&&y| y > 0.0).count();
    let (sharpe_ratio, sharpe_defined) = sharpe(mean, std_dev);

    let mut sorted = yields.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(SimulationSummary {
        trial_count: yields.len(),
        mean_yield: mean.clamp(min, max),
        std_dev,
        min_yield: min,
        max_yield: max,
        sharpe_ratio,
        sharpe_defined,
        success_rate: successes as f64 / n,
        percentile_5: percentile_sorted(&sorted, 5.0),
        percentile_95: percentile_sorted(&sorted, 95.0),
        expected_yield,
    })
}

/// `mean / std_dev`, guarded: zero (or non-finite) dispersion reports `(0, false)`.
pub fn sharpe(mean: f64, std_dev: f64) -> (f64, bool) {
    if std_dev > 0.0 && std_dev.is_finite() {
        (mean / std_dev, true)
    } else {
        (0.0, false)
    }
}

/// Linear interpolation between closest ranks. `sorted` must be ascending
/// and non-empty; `pct` is in [0, 100].
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Streaming accumulator
// ---------------------------------------------------------------------------

/// Mergeable running moments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    successes: u64,
}

impl Default for YieldAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            successes: 0,
        }
    }
}

impl YieldAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, y: f64) {
        self.count += 1;
        let delta = y - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (y - self.mean);
        self.min = self.min.min(y);
        self.max = self.max.max(y);
        if y > 0.0 {
            self.successes += 1;
        }
    }

    /// Combine two partial accumulators. Associative up to rounding.
    pub fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = count as f64;
        Self {
            count,
            mean: self.mean + delta * n_b / n,
            m2: self.m2 + other.m2 + delta * delta * n_a * n_b / n,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            successes: self.successes + other.successes,
        }
    }

    pub fn count(&self) -> u64 { self.count }

    pub fn mean(&self) -> f64 { self.mean }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 { 0.0 } else { (self.m2 / self.count as f64).max(0.0) }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 { self.min }

    pub fn max(&self) -> f64 { self.max }

    pub fn success_rate(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.successes as f64 / self.count as f64 }
    }
}

impl Extend<f64> for YieldAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for y in iter {
            self.push(y);
        }
    }
}

impl FromIterator<f64> for YieldAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}
