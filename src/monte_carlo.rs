// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Monte Carlo driver.
//!
//! Runs `trial_count` independent trials and summarizes the yields. Trial
//! `k` draws only from `factory.stream(k)`, and yields are collected in trial
//! order before aggregation, so [`ExecutionStrategy::Serial`] and
//! [`ExecutionStrategy::Parallel`] produce bit-identical summaries.

use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

use crate::allocator::{allocate_with_regime, split, AllocationDecision};
use crate::config::{ConditionRegime, ExecutionStrategy, SimulationConfig};
use crate::error::InvalidInputError;
use crate::random::{ChaChaFactory, RandomSource, RngFactory};
use crate::stats::summarize;
use crate::trial::{blend, check_shape};
use crate::types::{MarketConditions, Pool, SimulationSummary};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Allocation used for the run plus its yield summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Allocation under the caller's conditions (the one every trial uses
    /// under [`ConditionRegime::Fixed`]).
    pub decision: AllocationDecision,
    pub summary: SimulationSummary,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run the simulation and return the summary only.
pub fn run_simulation<F: RngFactory>(
    capital: f64,
    pools: &[Pool],
    conditions: MarketConditions,
    config: &SimulationConfig,
    factory: &F,
) -> Result<SimulationSummary, InvalidInputError> {
    forecast(capital, pools, conditions, config, factory).map(|f| f.summary)
}

/// Run with ChaCha8 streams seeded from `config.seed`.
pub fn run_seeded(
    capital: f64,
    pools: &[Pool],
    conditions: MarketConditions,
    config: &SimulationConfig,
) -> Result<Forecast, InvalidInputError> {
    forecast(capital, pools, conditions, config, &ChaChaFactory::new(config.seed))
}

/// Run the simulation, keeping the base allocation alongside the summary.
pub fn forecast<F: RngFactory>(
    capital: f64,
    pools: &[Pool],
    conditions: MarketConditions,
    config: &SimulationConfig,
    factory: &F,
) -> Result<Forecast, InvalidInputError> {
    config.validate()?;
    let decision = allocate_with_regime(capital, pools, conditions, &config.allocator)?;
    check_shape(&decision.allocation, pools)?;

    let start = Instant::now();
    let yields = sample_yields(&decision, pools, config, factory)?;
    let expected_yield = decision.allocation.weighted_base_apy(pools);
    let summary = summarize(&yields, expected_yield).ok_or(InvalidInputError::NoTrials)?;

    info!(
        trials = summary.trial_count,
        mean_yield = summary.mean_yield,
        std_dev = summary.std_dev,
        execution = ?config.execution,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "monte carlo run complete"
    );

    Ok(Forecast { decision, summary })
}

/// Per-trial yields in trial order. Inputs must already be validated; only a
/// resampled split can still fail.
pub fn sample_yields<F: RngFactory>(
    base: &AllocationDecision,
    pools: &[Pool],
    config: &SimulationConfig,
    factory: &F,
) -> Result<Vec<f64>, InvalidInputError> {
    let n = config.trial_count;
    let run_trial = |k: usize| {
        let mut rng = factory.stream(k as u64);
        one_trial(base, pools, config, &mut rng)
    };
    match config.execution {
        ExecutionStrategy::Serial => (0..n).map(run_trial).collect(),
        ExecutionStrategy::Parallel => (0..n).into_par_iter().map(run_trial).collect(),
    }
}

fn one_trial<R: RandomSource + ?Sized>(
    base: &AllocationDecision,
    pools: &[Pool],
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<f64, InvalidInputError> {
    match config.regime {
        ConditionRegime::Fixed => {
            Ok(blend(&base.allocation, pools, base.conditions.volatility, config.noise, rng))
        }
        ConditionRegime::Resample { spread } => {
            let drawn = resample(base.conditions, spread, rng);
            let decision = split(base.allocation.capital(), pools, drawn, &config.allocator)?;
            Ok(blend(&decision.allocation, pools, drawn.volatility, config.noise, rng))
        }
    }
}

/// Jitter both conditions by `spread * U(-1, 1)`, clamped to [0, 1].
fn resample<R: RandomSource + ?Sized>(
    base: MarketConditions,
    spread: f64,
    rng: &mut R,
) -> MarketConditions {
    let volatility = base.volatility + spread * rng.next_symmetric();
    let sentiment = base.sentiment + spread * rng.next_symmetric();
    MarketConditions::new(volatility, sentiment).clamped()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
