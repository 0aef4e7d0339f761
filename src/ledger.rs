// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Ledger amounts -- turning an f64 allocation into fixed-scale decimals.
//!
//! A ledger wants exact amounts. Each entry is truncated to `scale` decimal
//! places, then the missing units (`capital` rounded to `scale`, minus the
//! truncated sum) are handed out one by one to the entries with the largest
//! truncated remainder. The amounts then sum exactly to the rounded capital.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;
use crate::trial::check_shape;
use crate::types::{AllocationVector, Pool};

/// Largest supported number of decimal places.
pub const MAX_SCALE: u32 = 18;

/// Drops-per-XRP precision on the XRP Ledger.
pub const XRP_SCALE: u32 = 6;

/// Exact amount destined for one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAmount {
    pub pool: String,
    pub amount: Decimal,
}

/// Convert f64 to Decimal.
pub fn to_decimal(v: f64) -> Result<Decimal, InvalidInputError> {
    Decimal::from_f64(v).ok_or(InvalidInputError::Unrepresentable(v))
}

pub fn to_ledger_amounts(
    allocation: &AllocationVector,
    pools: &[Pool],
    scale: u32,
) -> Result<Vec<PoolAmount>, InvalidInputError> {
    if scale > MAX_SCALE {
        return Err(InvalidInputError::InvalidScale(scale));
    }
    check_shape(allocation, pools)?;

    let total = to_decimal(allocation.capital())?.round_dp(scale);
    let unit = Decimal::new(1, scale);

    let mut floors = Vec::with_capacity(allocation.len());
    let mut remainders = Vec::with_capacity(allocation.len());
    for &amount in allocation {
        let exact = to_decimal(amount.max(0.0))?;
        let floor = exact.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
        remainders.push(exact - floor);
        floors.push(floor);
    }

    let overflow = || InvalidInputError::Unrepresentable(allocation.capital());
    let shortfall = total - floors.iter().copied().sum::<Decimal>();
    let units = shortfall.checked_div(unit).ok_or_else(overflow)?.round();

    // largest remainder first, lower index wins ties
    let mut order: Vec<usize> = (0..floors.len()).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));

    if units > Decimal::ZERO {
        // whole rounds in one step, then the leftover by largest remainder
        let n = Decimal::from(floors.len());
        let per = (units / n).trunc();
        let leftover = (units - per * n).to_usize().ok_or_else(overflow)?;
        let step = per.checked_mul(unit).ok_or_else(overflow)?;
        for floor in floors.iter_mut() {
            *floor = floor.checked_add(step).ok_or_else(overflow)?;
        }
        for &i in order.iter().take(leftover) {
            floors[i] += unit;
        }
    } else if units < Decimal::ZERO {
        // over-allocated by float noise: take units back, smallest remainders
        // first, never driving an amount below zero
        reclaim(&mut floors, &order, -units, unit);
    }

    Ok(pools
        .iter()
        .zip(floors)
        .map(|(pool, amount)| PoolAmount { pool: pool.name.clone(), amount })
        .collect())
}

/// Take `owed` units back from `floors`, spread evenly over the entries that
/// still hold any, the last partial round going to the back of `order`.
fn reclaim(floors: &mut [Decimal], order: &[usize], mut owed: Decimal, unit: Decimal) {
    while owed > Decimal::ZERO {
        let holders: Vec<usize> = order
            .iter()
            .rev()
            .copied()
            .filter(|&i| floors[i] >= unit)
            .collect();
        if holders.is_empty() {
            return;
        }
        let per = (owed / Decimal::from(holders.len())).trunc();
        if per.is_zero() {
            for &i in holders.iter() {
                if owed.is_zero() {
                    break;
                }
                floors[i] -= unit;
                owed -= Decimal::ONE;
            }
            continue;
        }
        for &i in &holders {
            let held = floors[i].checked_div(unit).map(|h| h.trunc()).unwrap_or(owed);
            let take = per.min(held);
            floors[i] -= take * unit;
            owed -= take;
        }
    }
}
