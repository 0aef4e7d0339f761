// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - volatility-conditioned pool allocation and Monte Carlo
// yield forecasting.

pub mod error;
pub mod types;
pub mod registry;
pub mod config;
pub mod random;
pub mod allocator;
pub mod trial;
pub mod stats;
pub mod monte_carlo;
pub mod market;
pub mod poll;
pub mod ledger;
pub mod wasm;

pub use allocator::{allocate, allocate_with_regime, AllocationDecision, AllocationRegime};
pub use config::{
    AllocatorConfig, ConditionPolicy, ConditionRegime, ExecutionStrategy, NoiseModel,
    SimulationConfig,
};
pub use error::{ConfigError, InvalidInputError};
pub use market::{FixedMarket, MarketDataPort};
pub use monte_carlo::{forecast, run_seeded, run_simulation, Forecast};
pub use poll::{ForecastPoller, ForecastSnapshot};
pub use random::{ChaChaFactory, RandomSource, RngFactory};
pub use registry::PoolRegistry;
pub use trial::simulate_one_trial;
pub use types::*;
