// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Volatility-conditioned capital allocation.
//!
//! Each pool's weight is its base APY, multiplied by the eco boost for
//! eco-flagged pools. In a calm market all capital is split by weight. Once
//! volatility rises above the configured threshold, `stable_shift` of the
//! capital goes to stable pools (split by weight among them) and the
//! remainder is split by weight among the rest:
//!
//! ```text
//! stable_i     = capital * stable_shift       * w_i / Σ w_stable
//! non_stable_j = capital * (1 - stable_shift) * w_j / Σ w_non_stable
//! ```
//!
//! A group whose weights sum to zero is split evenly. If no pool is stable
//! under high volatility the whole capital is split evenly.

use tracing::{debug, warn};

use crate::config::{AllocatorConfig, ConditionPolicy};
use crate::error::InvalidInputError;
use crate::registry::validate_pools;
use crate::types::{in_unit, AllocationVector, MarketConditions, Pool};

// ---------------------------------------------------------------------------
// Regime
// ---------------------------------------------------------------------------

/// Which branch of the allocation policy applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationRegime {
    /// Volatility at or below the threshold.
    Calm,
    /// Volatility above the threshold with at least one stable pool.
    StableShift,
    /// Volatility above the threshold and no stable pool to shift into.
    EvenFallback,
}

/// Allocation plus the regime that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationDecision {
    pub allocation: AllocationVector,
    pub regime: AllocationRegime,
    /// Conditions after clamping.
    pub conditions: MarketConditions,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Split `capital` across `pools` under `conditions`.
pub fn allocate(
    capital: f64,
    pools: &[Pool],
    conditions: MarketConditions,
    config: &AllocatorConfig,
) -> Result<AllocationVector, InvalidInputError> {
    allocate_with_regime(capital, pools, conditions, config).map(|d| d.allocation)
}

/// As [`allocate`], also reporting which regime applied.
pub fn allocate_with_regime(
    capital: f64,
    pools: &[Pool],
    conditions: MarketConditions,
    config: &AllocatorConfig,
) -> Result<AllocationDecision, InvalidInputError> {
    validate_capital(capital)?;
    validate_pools(pools)?;
    config.validate()?;
    let conditions = resolve_conditions(conditions, config.condition_policy)?;
    let decision = split(capital, pools, conditions, config)?;
    if decision.regime == AllocationRegime::EvenFallback {
        warn!(
            volatility = conditions.volatility,
            "high volatility with no stable pools, splitting evenly"
        );
    }
    debug!(
        capital,
        volatility = conditions.volatility,
        regime = ?decision.regime,
        pools = pools.len(),
        "allocated capital"
    );
    Ok(decision)
}

pub(crate) fn validate_capital(capital: f64) -> Result<(), InvalidInputError> {
    if capital.is_finite() && capital > 0.0 {
        Ok(())
    } else {
        Err(InvalidInputError::NonPositiveCapital(capital))
    }
}

/// Apply the configured policy to raw conditions.
pub(crate) fn resolve_conditions(
    conditions: MarketConditions,
    policy: ConditionPolicy,
) -> Result<MarketConditions, InvalidInputError> {
    if conditions.is_in_range() {
        return Ok(conditions);
    }
    match policy {
        ConditionPolicy::Clamp => {
            let clamped = conditions.clamped();
            warn!(
                volatility = conditions.volatility,
                sentiment = conditions.sentiment,
                "market conditions outside [0, 1], clamping"
            );
            Ok(clamped)
        }
        ConditionPolicy::Strict => {
            let (field, value) = if in_unit(conditions.volatility) {
                ("sentiment", conditions.sentiment)
            } else {
                ("volatility", conditions.volatility)
            };
            Err(InvalidInputError::ConditionOutOfRange { field, value })
        }
    }
}

/// Largest relative gap between the split and `capital` that residual
/// settling absorbs.
const SUM_TOLERANCE: f64 = 1e-9;

/// Allocation core. Inputs must already be validated and conditions resolved.
/// Does not log; the Monte Carlo driver calls it once per resampled trial.
pub(crate) fn split(
    capital: f64,
    pools: &[Pool],
    conditions: MarketConditions,
    config: &AllocatorConfig,
) -> Result<AllocationDecision, InvalidInputError> {
    let weights: Vec<f64> = pools.iter().map(|p| weight(p, config.eco_boost)).collect();
    if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
        return Err(InvalidInputError::InvalidConfig(format!(
            "eco-boosted weight of {} overflows",
            pools[i].name
        )));
    }
    let mut amounts = vec![0.0; pools.len()];

    let high_vol = conditions.volatility > config.high_volatility_threshold;
    let has_stable = pools.iter().any(|p| p.is_stable);

    let regime = if !high_vol {
        let all: Vec<usize> = (0..pools.len()).collect();
        distribute(capital, &all, &weights, &mut amounts);
        AllocationRegime::Calm
    } else if !has_stable {
        let even = capital / pools.len() as f64;
        amounts.iter_mut().for_each(|a| *a = even);
        AllocationRegime::EvenFallback
    } else {
        let (stable, other): (Vec<usize>, Vec<usize>) =
            (0..pools.len()).partition(|&i| pools[i].is_stable);
        if other.is_empty() {
            distribute(capital, &stable, &weights, &mut amounts);
        } else {
            let stable_capital = capital * config.stable_shift;
            distribute(stable_capital, &stable, &weights, &mut amounts);
            distribute(capital - stable_capital, &other, &weights, &mut amounts);
        }
        AllocationRegime::StableShift
    };

    settle_residual(capital, &mut amounts)?;

    Ok(AllocationDecision {
        allocation: AllocationVector::from_parts(capital, amounts),
        regime,
        conditions,
    })
}

fn weight(pool: &Pool, eco_boost: f64) -> f64 {
    if pool.is_eco {
        pool.base_apy * eco_boost
    } else {
        pool.base_apy
    }
}

/// Split `amount` across `members` by weight; evenly if the weights sum to 0.
/// Shares are formed before scaling so `amount * share` never exceeds `amount`.
fn distribute(amount: f64, members: &[usize], weights: &[f64], out: &mut [f64]) {
    if members.is_empty() {
        return;
    }
    let max = members.iter().map(|&i| weights[i]).fold(0.0_f64, f64::max);
    if max > 0.0 {
        // normalized by the largest weight, so the total stays finite
        let total: f64 = members.iter().map(|&i| weights[i] / max).sum();
        for &i in members {
            out[i] = amount * ((weights[i] / max) / total);
        }
    } else {
        let even = amount / members.len() as f64;
        for &i in members {
            out[i] = even;
        }
    }
}

/// Fold the floating-point residual into the largest entry. Fails when the
/// amounts no longer sum to a finite value near `capital`.
fn settle_residual(capital: f64, amounts: &mut [f64]) -> Result<(), InvalidInputError> {
    let sum: f64 = amounts.iter().sum();
    let residual = capital - sum;
    if !residual.is_finite() || residual.abs() > capital * SUM_TOLERANCE {
        return Err(InvalidInputError::CapitalOverflow(capital));
    }
    if residual == 0.0 {
        return Ok(());
    }
    let largest = amounts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    if let Some(i) = largest {
        let settled = amounts[i] + residual;
        if !settled.is_finite() {
            return Err(InvalidInputError::CapitalOverflow(capital));
        }
        amounts[i] = settled.max(0.0);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
