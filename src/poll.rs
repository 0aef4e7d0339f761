// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - Polling Forecaster
//
// One poll = read the market port, allocate, run Monte Carlo, return a
// snapshot. There is no timer here: the caller owns the schedule.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocator::AllocationRegime;
use crate::config::SimulationConfig;
use crate::error::InvalidInputError;
use crate::market::MarketDataPort;
use crate::monte_carlo::forecast;
use crate::random::ChaChaFactory;
use crate::registry::validate_pools;
use crate::types::{AllocationVector, MarketConditions, Pool, SimulationSummary};

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub poll: u64,
    pub seed: u64,
    /// Conditions as used, after clamping.
    pub conditions: MarketConditions,
    pub stable_shift_active: bool,
    pub allocation: AllocationVector,
    pub summary: SimulationSummary,
}

pub struct ForecastPoller<M> {
    capital: f64,
    pools: Vec<Pool>,
    config: SimulationConfig,
    market: M,
    polls: u64,
}

impl<M: MarketDataPort> ForecastPoller<M> {
    /// Validates everything up front so `poll` only fails on bad feed data
    /// under a strict condition policy.
    pub fn new(
        capital: f64,
        pools: Vec<Pool>,
        config: SimulationConfig,
        market: M,
    ) -> Result<Self, InvalidInputError> {
        crate::allocator::validate_capital(capital)?;
        validate_pools(&pools)?;
        config.validate()?;
        Ok(Self { capital, pools, config, market, polls: 0 })
    }

    /// Run one forecast. Poll `n` uses seed `config.seed + n`.
    pub fn poll(&mut self) -> Result<ForecastSnapshot, InvalidInputError> {
        let conditions = self.market.conditions();
        let seed = self.config.seed.wrapping_add(self.polls);
        let result = forecast(
            self.capital,
            &self.pools,
            conditions,
            &self.config,
            &ChaChaFactory::new(seed),
        )?;
        let snapshot = ForecastSnapshot {
            poll: self.polls,
            seed,
            conditions: result.decision.conditions,
            stable_shift_active: result.decision.regime == AllocationRegime::StableShift,
            allocation: result.decision.allocation,
            summary: result.summary,
        };
        debug!(poll = self.polls, volatility = snapshot.conditions.volatility, "poll complete");
        self.polls += 1;
        Ok(snapshot)
    }

    pub fn polls(&self) -> u64 { self.polls }

    pub fn pools(&self) -> &[Pool] { &self.pools }

    pub fn market_mut(&mut self) -> &mut M { &mut self.market }
}

impl<M: MarketDataPort> Iterator for ForecastPoller<M> {
    type Item = Result<ForecastSnapshot, InvalidInputError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.poll())
    }
}
