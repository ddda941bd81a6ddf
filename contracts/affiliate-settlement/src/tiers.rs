//! # Commission Tier Policy
//!
//! Fixed ascending table of cumulative-sales thresholds and the commission
//! rate each one unlocks.
//!
//! | Tier | Cumulative sales | Rate |
//! |------|------------------|------|
//! | 0    | $0+              | 5%   |
//! | 1    | $10,000+         | 7%   |
//! | 2    | $50,000+         | 10%  |
//!
//! The policy is always evaluated on the affiliate's cumulative sales
//! *including* the sale being settled, so the sale that crosses a threshold
//! already earns the higher rate.

use soroban_sdk::{contracttype, Env, Vec};

/// Smallest token units per whole dollar (7 decimal places).
pub const UNIT: i128 = 10_000_000;

/// `(min cumulative sales, rate in bps)`, strictly ascending by threshold.
pub const TIER_TABLE: [(i128, u32); 3] = [(0, 500), (10_000 * UNIT, 700), (50_000 * UNIT, 1_000)];

/// One row of the tier table as exposed to callers.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct TierBand {
    pub tier: u32,
    /// Minimum cumulative sales (inclusive)
    pub min_sales: i128,
    pub rate_bps: u32,
}

/// Ordinal of the highest tier whose threshold is `<= cumulative_sales`.
pub fn tier_for(cumulative_sales: i128) -> u32 {
    let mut tier = 0u32;
    for (idx, (threshold, _)) in TIER_TABLE.iter().enumerate() {
        if cumulative_sales >= *threshold {
            tier = idx as u32;
        }
    }
    tier
}

/// Commission rate, in bps, of [`tier_for`]`(cumulative_sales)`.
pub fn rate_for(cumulative_sales: i128) -> u32 {
    rate_of(tier_for(cumulative_sales))
}

/// Rate of a tier ordinal; ordinals past the table get the top rate.
pub fn rate_of(tier: u32) -> u32 {
    let idx = (tier as usize).min(TIER_TABLE.len() - 1);
    TIER_TABLE[idx].1
}

pub fn bands(env: &Env) -> Vec<TierBand> {
    let mut out = Vec::new(env);
    for (idx, (min_sales, rate_bps)) in TIER_TABLE.iter().enumerate() {
        out.push_back(TierBand {
            tier: idx as u32,
            min_sales: *min_sales,
            rate_bps: *rate_bps,
        });
    }
    out
}
