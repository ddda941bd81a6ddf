//! # Structured Event Emissions
//!
//! Events are the engine's structured log. Each carries a short-symbol topic
//! for filtering and a typed payload for indexers. Events are only observable
//! for successful invocations; a failed `settle` emits nothing.
//!
//! | Topic      | Event                    |
//! |------------|--------------------------|
//! | `aff_reg`  | Affiliate registered     |
//! | `aff_act`  | Affiliate (de)activated  |
//! | `tier_up`  | Affiliate tier increased |
//! | `settled`  | Sale settled             |
//! | `trsy_set` | Treasury re-pointed      |
//! | `role_gr`  | Role granted             |
//! | `role_rv`  | Role revoked             |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::settlement::SettlementRecord;

pub const TOPIC_AFFILIATE_REGISTERED: Symbol = symbol_short!("aff_reg");
pub const TOPIC_AFFILIATE_STATUS: Symbol = symbol_short!("aff_act");
pub const TOPIC_TIER_UPGRADED: Symbol = symbol_short!("tier_up");
pub const TOPIC_SETTLED: Symbol = symbol_short!("settled");
pub const TOPIC_TREASURY_CHANGED: Symbol = symbol_short!("trsy_set");
pub const TOPIC_ROLE_GRANTED: Symbol = symbol_short!("role_gr");
pub const TOPIC_ROLE_REVOKED: Symbol = symbol_short!("role_rv");

#[contracttype]
#[derive(Clone, Debug)]
pub struct AffiliateRegisteredEvent {
    pub affiliate: Address,
    pub requested_code: String,
    /// May carry a numeric suffix when the requested code was taken
    pub assigned_code: String,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AffiliateStatusEvent {
    pub affiliate: Address,
    pub active: bool,
    pub changed_by: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TierUpgradedEvent {
    pub affiliate: Address,
    pub old_tier: u32,
    pub new_tier: u32,
    pub total_sales: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TreasuryChangedEvent {
    pub old_treasury: Address,
    pub new_treasury: Address,
    pub changed_by: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoleChangedEvent {
    pub account: Address,
    pub role: u32,
    pub changed_by: Address,
}

pub fn emit_affiliate_registered(
    env: &Env,
    affiliate: &Address,
    requested_code: &String,
    assigned_code: &String,
) {
    let event = AffiliateRegisteredEvent {
        affiliate: affiliate.clone(),
        requested_code: requested_code.clone(),
        assigned_code: assigned_code.clone(),
    };
    env.events()
        .publish((TOPIC_AFFILIATE_REGISTERED, affiliate.clone()), event);
}

pub fn emit_affiliate_status(env: &Env, affiliate: &Address, active: bool, changed_by: &Address) {
    let event = AffiliateStatusEvent {
        affiliate: affiliate.clone(),
        active,
        changed_by: changed_by.clone(),
    };
    env.events()
        .publish((TOPIC_AFFILIATE_STATUS, affiliate.clone()), event);
}

pub fn emit_tier_upgraded(
    env: &Env,
    affiliate: &Address,
    old_tier: u32,
    new_tier: u32,
    total_sales: i128,
) {
    let event = TierUpgradedEvent {
        affiliate: affiliate.clone(),
        old_tier,
        new_tier,
        total_sales,
    };
    env.events()
        .publish((TOPIC_TIER_UPGRADED, affiliate.clone()), event);
}

pub fn emit_settled(env: &Env, record: &SettlementRecord) {
    env.events()
        .publish((TOPIC_SETTLED, record.registry.clone()), record.clone());
}

pub fn emit_treasury_changed(
    env: &Env,
    old_treasury: &Address,
    new_treasury: &Address,
    changed_by: &Address,
) {
    let event = TreasuryChangedEvent {
        old_treasury: old_treasury.clone(),
        new_treasury: new_treasury.clone(),
        changed_by: changed_by.clone(),
    };
    env.events().publish((TOPIC_TREASURY_CHANGED,), event);
}

pub fn emit_role_granted(env: &Env, account: &Address, role: u32, changed_by: &Address) {
    let event = RoleChangedEvent {
        account: account.clone(),
        role,
        changed_by: changed_by.clone(),
    };
    env.events().publish((TOPIC_ROLE_GRANTED,), event);
}

pub fn emit_role_revoked(env: &Env, account: &Address, role: u32, changed_by: &Address) {
    let event = RoleChangedEvent {
        account: account.clone(),
        role,
        changed_by: changed_by.clone(),
    };
    env.events().publish((TOPIC_ROLE_REVOKED,), event);
}
