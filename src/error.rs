// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Error types.
//!
//! Every precondition violation in the allocator, trial model and Monte Carlo
//! driver is reported as an [`InvalidInputError`]. Nothing in the core touches
//! I/O, so there is no retryable or partial-failure class. [`ConfigError`]
//! only appears at the file-loading edge.

// ---------------------------------------------------------------------------
// InvalidInputError
// ---------------------------------------------------------------------------

/// A rejected input. Calls that return this never produce a partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("capital must be finite and positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("pool list is empty")]
    EmptyPools,

    #[error("duplicate pool name: {0}")]
    DuplicatePoolName(String),

    #[error("pool {name} has invalid base APY {base_apy}")]
    InvalidBaseApy { name: String, base_apy: f64 },

    #[error("pool {name} has invalid liquidity {liquidity}")]
    InvalidLiquidity { name: String, liquidity: f64 },

    #[error("allocation has {allocation} entries but there are {pools} pools")]
    LengthMismatch { allocation: usize, pools: usize },

    #[error("trial count must be at least 1")]
    NoTrials,

    #[error("trial count {requested} exceeds the limit of {limit}")]
    TooManyTrials { requested: usize, limit: usize },

    #[error("market condition {field} = {value} is outside [0, 1]")]
    ConditionOutOfRange { field: &'static str, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("decimal scale {0} is not supported (max 18)")]
    InvalidScale(u32),

    #[error("{0} cannot be represented as a decimal amount")]
    Unrepresentable(f64),

    #[error("capital {0} cannot be split without overflowing")]
    CapitalOverflow(f64),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Failure to load a configuration or pool file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] InvalidInputError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = InvalidInputError::NonPositiveCapital(-100.0);
        assert_eq!(err.to_string(), "capital must be finite and positive, got -100");

        let err = InvalidInputError::LengthMismatch { allocation: 2, pools: 3 };
        assert!(err.to_string().contains("2 entries"));
    }

    #[test]
    fn invalid_input_converts_into_config_error() {
        let err: ConfigError = InvalidInputError::NoTrials.into();
        assert!(matches!(err, ConfigError::Invalid(InvalidInputError::NoTrials)));
    }
}
