// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Yield Forecast - Pool Registry
//
// Ordered, validated pool lists. The registry is a value: callers own it and
// pass `pools()` by reference into the allocator and the simulator.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, InvalidInputError};
use crate::types::Pool;

/// Check the pool-list preconditions shared by every entry point.
pub fn validate_pools(pools: &[Pool]) -> Result<(), InvalidInputError> {
    if pools.is_empty() {
        return Err(InvalidInputError::EmptyPools);
    }
    let mut seen = HashSet::with_capacity(pools.len());
    for pool in pools {
        if !seen.insert(pool.name.as_str()) {
            return Err(InvalidInputError::DuplicatePoolName(pool.name.clone()));
        }
        if !pool.base_apy.is_finite() || pool.base_apy < 0.0 {
            return Err(InvalidInputError::InvalidBaseApy {
                name: pool.name.clone(),
                base_apy: pool.base_apy,
            });
        }
        if !pool.liquidity.is_finite() || pool.liquidity < 0.0 {
            return Err(InvalidInputError::InvalidLiquidity {
                name: pool.name.clone(),
                liquidity: pool.liquidity,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pool>", into = "Vec<Pool>")]
pub struct PoolRegistry {
    pools: Vec<Pool>,
}

impl PoolRegistry {
    pub fn new(pools: Vec<Pool>) -> Result<Self, InvalidInputError> {
        validate_pools(&pools)?;
        Ok(Self { pools })
    }

    /// XRPL AMM pools used by the dashboard presets.
    pub fn xrpl_defaults() -> Self {
        Self {
            pools: vec![
                Pool::new("RLUSD/XRP", 0.35).stable().with_liquidity(2_500_000.0),
                Pool::new("Solar/XRP", 0.30).eco().with_liquidity(750_000.0),
                Pool::new("XRP/USDC", 0.18).stable().with_liquidity(4_000_000.0),
                Pool::new("Wind/XRP", 0.42).eco().with_liquidity(400_000.0),
                Pool::new("SOLO/XRP", 0.55).with_liquidity(300_000.0),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let pools: Vec<Pool> = serde_json::from_str(json)?;
        Ok(Self::new(pools)?)
    }

    pub fn from_json_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn pools(&self) -> &[Pool] { &self.pools }

    pub fn len(&self) -> usize { self.pools.len() }

    pub fn is_empty(&self) -> bool { self.pools.is_empty() }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.pools.iter().position(|p| p.name == name)
    }

    /// Keep only the named pools, in registry order. Every name must exist.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, InvalidInputError> {
        if let Some(missing) = names.iter().find(|n| self.index_of(n.as_ref()).is_none()) {
            return Err(InvalidInputError::InvalidConfig(format!(
                "unknown pool {}",
                missing.as_ref()
            )));
        }
        let pools: Vec<Pool> = self.pools.iter()
            .filter(|p| names.iter().any(|n| n.as_ref() == p.name))
            .cloned()
            .collect();
        Self::new(pools)
    }
}

impl TryFrom<Vec<Pool>> for PoolRegistry {
    type Error = InvalidInputError;
    fn try_from(pools: Vec<Pool>) -> Result<Self, Self::Error> {
        Self::new(pools)
    }
}

impl From<PoolRegistry> for Vec<Pool> {
    fn from(registry: PoolRegistry) -> Self { registry.pools }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let registry = PoolRegistry::xrpl_defaults();
        assert!(validate_pools(registry.pools()).is_ok());
        assert_eq!(registry.index_of("Solar/XRP"), Some(1));
        assert!(registry.pools()[0].is_stable);
    }

    #[test]
    fn rejects_empty_list() {
        assert_eq!(PoolRegistry::new(vec![]), Err(InvalidInputError::EmptyPools));
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = PoolRegistry::new(vec![Pool::new("a", 0.1), Pool::new("a", 0.2)]);
        assert_eq!(result, Err(InvalidInputError::DuplicatePoolName("a".into())));
    }

    #[test]
    fn rejects_negative_apy_and_liquidity() {
        let result = validate_pools(&[Pool::new("a", -0.1)]);
        assert!(matches!(result, Err(InvalidInputError::InvalidBaseApy { .. })));

        let result = validate_pools(&[Pool::new("a", 0.1).with_liquidity(-1.0)]);
        assert!(matches!(result, Err(InvalidInputError::InvalidLiquidity { .. })));

        let result = validate_pools(&[Pool::new("a", f64::NAN)]);
        assert!(matches!(result, Err(InvalidInputError::InvalidBaseApy { .. })));
    }

    #[test]
    fn json_round_trip_validates() {
        let json = r#"[{"name":"x","baseAPY":0.2},{"name":"x","baseAPY":0.3}]"#;
        let err = PoolRegistry::from_json_str(json).expect_err("test: duplicate names");
        assert!(matches!(err, ConfigError::Invalid(InvalidInputError::DuplicatePoolName(_))));

        let json = r#"[{"name":"x","baseAPY":0.2,"isEco":true}]"#;
        let registry = PoolRegistry::from_json_str(json).expect("test: valid registry");
        assert!(registry.pools()[0].is_eco);
    }

    #[test]
    fn subset_keeps_registry_order() {
        let registry = PoolRegistry::xrpl_defaults();
        let sub = registry.subset(&["Solar/XRP", "RLUSD/XRP"]).expect("test: subset");
        assert_eq!(sub.pools()[0].name, "RLUSD/XRP");
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn subset_rejects_unknown_names() {
        let registry = PoolRegistry::xrpl_defaults();
        let err = registry.subset(&["Solar/XRP", "Tidal/XRP"]).expect_err("test: unknown pool");
        assert!(matches!(err, InvalidInputError::InvalidConfig(msg) if msg.contains("Tidal/XRP")));
    }
}
