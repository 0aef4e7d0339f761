// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - Market Data Port
//
// The core never computes market conditions. Callers inject whatever feed
// they have (price oracle, sentiment score, governance vote) behind this port.

use crate::types::MarketConditions;

/// Supplier of the two condition inputs the allocator consumes.
pub trait MarketDataPort {
    fn volatility(&mut self) -> f64;

    fn sentiment(&mut self) -> f64;

    fn conditions(&mut self) -> MarketConditions {
        let volatility = self.volatility();
        let sentiment = self.sentiment();
        MarketConditions::new(volatility, sentiment)
    }
}

impl<M: MarketDataPort + ?Sized> MarketDataPort for &mut M {
    fn volatility(&mut self) -> f64 { (**self).volatility() }
    fn sentiment(&mut self) -> f64 { (**self).sentiment() }
    fn conditions(&mut self) -> MarketConditions { (**self).conditions() }
}

/// Constant conditions, set by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedMarket {
    conditions: MarketConditions,
}

impl FixedMarket {
    pub fn new(conditions: MarketConditions) -> Self {
        Self { conditions }
    }

    pub fn set(&mut self, conditions: MarketConditions) {
        self.conditions = conditions;
    }
}

impl MarketDataPort for FixedMarket {
    fn volatility(&mut self) -> f64 { self.conditions.volatility }
    fn sentiment(&mut self) -> f64 { self.conditions.sentiment }
}
