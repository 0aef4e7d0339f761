// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - WASM Interface
//
// Dashboard-facing surface. Inputs and outputs cross the boundary as plain
// JS objects via serde-wasm-bindgen; errors become JS strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::allocator::allocate_with_regime;
use crate::config::{ExecutionStrategy, SimulationConfig};
use crate::monte_carlo::run_seeded;
use crate::types::{MarketConditions, Pool};

#[wasm_bindgen]
pub struct YieldForecaster {
    config: SimulationConfig,
}

#[derive(Serialize)]
struct AllocationView<'a> {
    pool: &'a str,
    amount: f64,
    share: f64,
}

#[wasm_bindgen]
impl YieldForecaster {
    /// `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<YieldForecaster, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let mut config = if config_json.trim().is_empty() {
            SimulationConfig::default()
        } else {
            SimulationConfig::from_json_str(config_json).map_err(to_js)?
        };
        // no worker threads in the browser
        config.execution = ExecutionStrategy::Serial;
        Ok(Self { config })
    }

    pub fn allocate(&self, capital: f64, pools: JsValue, conditions: JsValue) -> Result<JsValue, JsValue> {
        let pools: Vec<Pool> = serde_wasm_bindgen::from_value(pools)?;
        let conditions: MarketConditions = serde_wasm_bindgen::from_value(conditions)?;
        let decision = allocate_with_regime(capital, &pools, conditions, &self.config.allocator)
            .map_err(to_js)?;
        let view: Vec<AllocationView> = pools
            .iter()
            .enumerate()
            .map(|(i, p)| AllocationView {
                pool: &p.name,
                amount: decision.allocation[i],
                share: decision.allocation.share(i),
            })
            .collect();
        Ok(serde_wasm_bindgen::to_value(&view)?)
    }

    pub fn run_simulation(&self, capital: f64, pools: JsValue, conditions: JsValue) -> Result<JsValue, JsValue> {
        let pools: Vec<Pool> = serde_wasm_bindgen::from_value(pools)?;
        let conditions: MarketConditions = serde_wasm_bindgen::from_value(conditions)?;
        let forecast = run_seeded(capital, &pools, conditions, &self.config).map_err(to_js)?;
        Ok(serde_wasm_bindgen::to_value(&forecast.summary)?)
    }

    pub fn set_trials(&mut self, trial_count: usize) { self.config.trial_count = trial_count; }
    pub fn set_seed(&mut self, seed: u64) { self.config.seed = seed; }
    pub fn set_eco_boost(&mut self, eco_boost: f64) { self.config.allocator.eco_boost = eco_boost; }
    pub fn set_stable_shift(&mut self, shift: f64) { self.config.allocator.stable_shift = shift; }

    pub fn trials(&self) -> usize { self.config.trial_count }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
