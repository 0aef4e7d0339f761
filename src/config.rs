// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Tunable parameters for the allocator and the Monte Carlo driver.
//!
//! Eco boost and stable shift are the only multipliers the allocator
//! recognises. Both configs load from JSON with every field optional.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InvalidInputError};

/// Hard ceiling on trials per run.
pub const MAX_TRIALS: usize = 10_000_000;

// ---------------------------------------------------------------------------
// ConditionPolicy
// ---------------------------------------------------------------------------

/// How out-of-range market conditions are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionPolicy {
    /// Clamp volatility and sentiment into [0, 1].
    #[default]
    Clamp,
    /// Reject anything outside [0, 1].
    Strict,
}

// ---------------------------------------------------------------------------
// AllocatorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Volatility strictly above this triggers the stable shift (default 0.5).
    pub high_volatility_threshold: f64,
    /// Fraction of capital moved to stable pools in high volatility (default 0.8).
    pub stable_shift: f64,
    /// Weight multiplier for eco pools (default 1.24).
    pub eco_boost: f64,
    pub condition_policy: ConditionPolicy,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            high_volatility_threshold: 0.5,
            stable_shift: 0.8,
            eco_boost: 1.24,
            condition_policy: ConditionPolicy::Clamp,
        }
    }
}

impl AllocatorConfig {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        unit_field("high_volatility_threshold", self.high_volatility_threshold)?;
        unit_field("stable_shift", self.stable_shift)?;
        if !self.eco_boost.is_finite() || self.eco_boost < 0.0 {
            return Err(InvalidInputError::InvalidConfig(format!(
                "eco_boost must be finite and >= 0, got {}",
                self.eco_boost
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulation knobs
// ---------------------------------------------------------------------------

/// Shape of the per-pool perturbation drawn in each trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseModel {
    /// `volatility * z` with `z ~ N(0, 1)`.
    #[default]
    Normal,
    /// `volatility * u` with `u ~ U(-1, 1)`.
    Uniform,
}

/// Whether market conditions stay fixed across trials.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionRegime {
    #[default]
    Fixed,
    /// Re-draw both conditions per trial as `base ± spread * U(-1, 1)`,
    /// clamped to [0, 1], and re-allocate for that trial.
    Resample { spread: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    #[default]
    Serial,
    /// Fan trials out over the rayon global pool.
    Parallel,
}

// ---------------------------------------------------------------------------
// SimulationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trial_count: usize,
    pub seed: u64,
    pub noise: NoiseModel,
    pub regime: ConditionRegime,
    pub execution: ExecutionStrategy,
    pub allocator: AllocatorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trial_count: 1000,
            seed: 42,
            noise: NoiseModel::Normal,
            regime: ConditionRegime::Fixed,
            execution: ExecutionStrategy::Serial,
            allocator: AllocatorConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_trials(mut self, trial_count: usize) -> Self {
        self.trial_count = trial_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_regime(mut self, regime: ConditionRegime) -> Self {
        self.regime = regime;
        self
    }

    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if self.trial_count < 1 {
            return Err(InvalidInputError::NoTrials);
        }
        if self.trial_count > MAX_TRIALS {
            return Err(InvalidInputError::TooManyTrials {
                requested: self.trial_count,
                limit: MAX_TRIALS,
            });
        }
        if let ConditionRegime::Resample { spread } = self.regime {
            if !spread.is_finite() || spread < 0.0 {
                return Err(InvalidInputError::InvalidConfig(format!(
                    "resample spread must be finite and >= 0, got {spread}"
                )));
            }
        }
        self.allocator.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

fn unit_field(name: &str, value: f64) -> Result<(), InvalidInputError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InvalidInputError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}
