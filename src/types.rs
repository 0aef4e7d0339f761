// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - Type Definitions

use serde::{Deserialize, Serialize};
use std::ops::Index;

// ─── Pool ───────────────────────────────────────────────────────────────────

/// A named capital-allocation target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    /// Expected base annual return as a fraction (0.35 = 35%).
    #[serde(alias = "baseAPY")]
    pub base_apy: f64,
    #[serde(default, alias = "isStable")]
    pub is_stable: bool,
    #[serde(default, alias = "isEco")]
    pub is_eco: bool,
    #[serde(default)]
    pub liquidity: f64,
}

impl Pool {
    pub fn new(name: impl Into<String>, base_apy: f64) -> Self {
        Self {
            name: name.into(),
            base_apy,
            is_stable: false,
            is_eco: false,
            liquidity: 0.0,
        }
    }

    pub fn stable(mut self) -> Self {
        self.is_stable = true;
        self
    }

    pub fn eco(mut self) -> Self {
        self.is_eco = true;
        self
    }

    pub fn with_liquidity(mut self, liquidity: f64) -> Self {
        self.liquidity = liquidity;
        self
    }
}

// ─── Market Conditions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub volatility: f64,
    pub sentiment: f64,
}

impl Default for MarketConditions {
    fn default() -> Self {
        Self { volatility: 0.0, sentiment: 0.5 }
    }
}

impl MarketConditions {
    pub fn new(volatility: f64, sentiment: f64) -> Self {
        Self { volatility, sentiment }
    }

    /// Copy with both fields forced into [0, 1]. NaN maps to 0.
    pub fn clamped(&self) -> Self {
        Self {
            volatility: clamp_unit(self.volatility),
            sentiment: clamp_unit(self.sentiment),
        }
    }

    pub fn is_in_range(&self) -> bool {
        in_unit(self.volatility) && in_unit(self.sentiment)
    }
}

pub(crate) fn in_unit(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

// ─── Allocation Vector ──────────────────────────────────────────────────────

/// Capital per pool, in pool order. Sums to `capital`; every entry is >= 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationVector {
    capital: f64,
    amounts: Vec<f64>,
}

impl AllocationVector {
    pub(crate) fn from_parts(capital: f64, amounts: Vec<f64>) -> Self {
        Self { capital, amounts }
    }

    pub fn capital(&self) -> f64 { self.capital }

    pub fn amounts(&self) -> &[f64] { &self.amounts }

    pub fn len(&self) -> usize { self.amounts.len() }

    pub fn is_empty(&self) -> bool { self.amounts.is_empty() }

    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    /// Fraction of capital held by entry `i`.
    pub fn share(&self, i: usize) -> f64 {
        self.amounts[i] / self.capital
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.amounts.iter()
    }

    /// Capital-weighted base APY: the noise-free return of this allocation.
    pub fn weighted_base_apy(&self, pools: &[Pool]) -> f64 {
        self.amounts.iter()
            .zip(pools)
            .map(|(amount, pool)| amount / self.capital * pool.base_apy)
            .sum()
    }

    /// Sum of amounts for pools matching `pred`.
    pub fn amount_where(&self, pools: &[Pool], pred: impl Fn(&Pool) -> bool) -> f64 {
        self.amounts.iter()
            .zip(pools)
            .filter(|(_, pool)| pred(pool))
            .map(|(amount, _)| amount)
            .sum()
    }
}

impl Index<usize> for AllocationVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 { &self.amounts[i] }
}

impl<'a> IntoIterator for &'a AllocationVector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;
    fn into_iter(self) -> Self::IntoIter { self.amounts.iter() }
}

// ─── Simulation Summary ─────────────────────────────────────────────────────

/// Aggregate statistics over the per-trial yields of one Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trial_count: usize,
    pub mean_yield: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min_yield: f64,
    pub max_yield: f64,
    /// `mean_yield / std_dev`, or 0 when `std_dev == 0`.
    pub sharpe_ratio: f64,
    /// False when the Sharpe ratio was guarded to 0.
    pub sharpe_defined: bool,
    /// Fraction of trials with yield > 0.
    pub success_rate: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    /// Noise-free capital-weighted base APY of the allocation.
    pub expected_yield: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_forces_unit_interval() {
        let c = MarketConditions::new(1.7, -0.2).clamped();
        assert_eq!(c.volatility, 1.0);
        assert_eq!(c.sentiment, 0.0);

        let c = MarketConditions::new(f64::NAN, 0.4).clamped();
        assert_eq!(c.volatility, 0.0);
        assert_eq!(c.sentiment, 0.4);
    }

    #[test]
    fn range_check() {
        assert!(MarketConditions::new(0.0, 1.0).is_in_range());
        assert!(!MarketConditions::new(1.01, 0.5).is_in_range());
        assert!(!MarketConditions::new(f64::INFINITY, 0.5).is_in_range());
    }

    #[test]
    fn pool_deserializes_from_camel_case() {
        let json = r#"{"name":"RLUSD/XRP","baseAPY":0.35,"isStable":true}"#;
        let pool: Pool = serde_json::from_str(json).expect("test: pool json");
        assert_eq!(pool.base_apy, 0.35);
        assert!(pool.is_stable);
        assert!(!pool.is_eco);
        assert_eq!(pool.liquidity, 0.0);
    }

    #[test]
    fn weighted_base_apy_uses_shares() {
        let pools = vec![Pool::new("a", 0.35), Pool::new("b", 0.30)];
        let alloc = AllocationVector::from_parts(10_000.0, vec![8_000.0, 2_000.0]);
        assert!((alloc.weighted_base_apy(&pools) - 0.34).abs() < 1e-12);
        assert_eq!(alloc.share(1), 0.2);
    }
}
