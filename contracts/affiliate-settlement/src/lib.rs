//! # Affiliate Settlement Engine
//!
//! Settles domain sales reported by trusted registries, splits each sale
//! between the treasury and an optional referring affiliate, and runs the
//! tiered commission program whose rate grows with an affiliate's lifetime
//! sales.
//!
//! ## Components
//!
//! - Registry trust checks against the external registry directory contract
//! - Affiliate ledger and referral code index ([`affiliates`])
//! - Fixed commission tier table ([`tiers`])
//! - Atomic settlement and the settlement log ([`settlement`])
//!
//! Each `settle` call either commits the transfers, the ledger update and the
//! settlement record together, or returns an error and commits nothing.

#![no_std]
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, String, Vec};

/// Registry directory client: WASM import for wasm32, crate for tests.
#[cfg(target_arch = "wasm32")]
mod registry_import {
    soroban_sdk::contractimport!(
        file = "../../target/wasm32-unknown-unknown/release/giant_registry_directory.wasm"
    );
    pub use Client as RegistryDirectoryContractClient;
}
#[cfg(not(target_arch = "wasm32"))]
mod registry_import {
    pub use giant_registry_directory::RegistryDirectoryContractClient;
}

// ─── Feature modules ───
pub mod access_control;
pub mod affiliates;
pub mod errors;
pub mod events;
pub mod settlement;
pub mod tiers;
pub mod transfer;
// ─── End feature modules ───

pub use access_control::ROLE_ADMIN;
pub use affiliates::AffiliateRecord;
pub use errors::SettlementError;
pub use settlement::SettlementRecord;
pub use tiers::TierBand;

// ─── Test modules ───
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod affiliates_test;
#[cfg(test)]
mod events_test;
// ─── End test modules ───

#[contracttype]
#[derive(Clone, Debug)]
pub enum DataKey {
    Config,
    /// Next settlement log position
    NextSeq,
    Affiliate(Address),
    /// Canonical referral code -> affiliate
    ReferralCode(String),
    /// Sale id -> settlement record
    Settlement(String),
    /// Log position -> sale id
    SettlementAt(u64),
    /// (affiliate, n) -> log position of the affiliate's n-th credited sale
    AffiliateSale(Address, u64),
    /// Held while a settlement updates the affiliate
    AffiliateLock(Address),
}

#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Receives the net of every sale
    pub treasury: Address,
    /// Token sales are paid in (a USD stablecoin in production)
    pub payment_token: Address,
    /// Registry directory contract consulted for trust checks
    pub registry_directory: Address,
}

fn load_config(env: &Env) -> Result<EngineConfig, SettlementError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(SettlementError::NotInitialized)
}

#[contract]
pub struct AffiliateSettlementContract;

#[contractimpl]
#[allow(clippy::too_many_arguments)]
impl AffiliateSettlementContract {
    // ── Initialization ──────────────────────────────────────────────

    /// One-time setup. `admin` must authorize and receives the ADMIN role.
    pub fn initialize(
        env: Env,
        admin: Address,
        treasury: Address,
        payment_token: Address,
        registry_directory: Address,
    ) -> Result<(), SettlementError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(SettlementError::AlreadyInitialized);
        }
        admin.require_auth();
        let config = EngineConfig {
            treasury,
            payment_token,
            registry_directory,
        };
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::NextSeq, &0u64);
        access_control::grant_role(&env, &admin, ROLE_ADMIN);
        Ok(())
    }

    // ── Admin ───────────────────────────────────────────────────────

    /// Re-point treasury payouts for future settlements.
    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), SettlementError> {
        let mut config = load_config(&env)?;
        access_control::require_admin(&env, &caller)?;
        let old = config.treasury.clone();
        config.treasury = treasury.clone();
        env.storage().instance().set(&DataKey::Config, &config);
        events::emit_treasury_changed(&env, &old, &treasury, &caller);
        Ok(())
    }

    pub fn grant_admin(env: Env, caller: Address, account: Address) -> Result<(), SettlementError> {
        load_config(&env)?;
        access_control::require_admin(&env, &caller)?;
        access_control::grant_role(&env, &account, ROLE_ADMIN);
        events::emit_role_granted(&env, &account, ROLE_ADMIN, &caller);
        Ok(())
    }

    /// Fails with `LastAdmin` rather than leave the engine unmanageable.
    pub fn revoke_admin(env: Env, caller: Address, account: Address) -> Result<(), SettlementError> {
        load_config(&env)?;
        access_control::require_admin(&env, &caller)?;
        if access_control::has_role(&env, &account, ROLE_ADMIN)
            && access_control::admin_count(&env) <= 1
        {
            return Err(SettlementError::LastAdmin);
        }
        access_control::revoke_role(&env, &account, ROLE_ADMIN);
        events::emit_role_revoked(&env, &account, ROLE_ADMIN, &caller);
        Ok(())
    }

    /// Enable or disable an affiliate for future commissions. History is kept.
    pub fn set_affiliate_active(
        env: Env,
        caller: Address,
        affiliate: Address,
        active: bool,
    ) -> Result<(), SettlementError> {
        load_config(&env)?;
        access_control::require_admin(&env, &caller)?;
        let previous = affiliates::set_active(&env, &affiliate, active)?;
        if previous != active {
            events::emit_affiliate_status(&env, &affiliate, active, &caller);
        }
        Ok(())
    }

    // ── Affiliates ──────────────────────────────────────────────────

    /// Register the caller as an affiliate.
    ///
    /// Returns the assigned referral code. It is the upper-cased
    /// `preferred_code` when free, otherwise a `-N` suffixed variant; callers
    /// must use the returned value.
    pub fn register_affiliate(
        env: Env,
        affiliate: Address,
        preferred_code: String,
    ) -> Result<String, SettlementError> {
        load_config(&env)?;
        affiliate.require_auth();
        let code = affiliates::register(&env, &affiliate, &preferred_code)?;
        events::emit_affiliate_registered(&env, &affiliate, &preferred_code, &code);
        Ok(code)
    }

    /// Full record for a registered affiliate, active or not.
    pub fn get_affiliate(env: Env, affiliate: Address) -> Result<AffiliateRecord, SettlementError> {
        affiliates::get(&env, &affiliate).ok_or(SettlementError::NotFound)
    }

    /// Owner of a referral code (case-insensitive).
    pub fn resolve_referral_code(env: Env, code: String) -> Option<Address> {
        affiliates::resolve(&env, &code)
    }

    // ── Settlement ──────────────────────────────────────────────────

    /// Settle one sale reported by `registry` and paid by `buyer`.
    ///
    /// Both must authorize. See [`settlement`] for the order of checks and
    /// the atomicity guarantees.
    pub fn settle(
        env: Env,
        sale_id: String,
        registry: Address,
        buyer: Address,
        gross_amount: i128,
        referral_code: Option<String>,
    ) -> Result<SettlementRecord, SettlementError> {
        let config = load_config(&env)?;
        settlement::settle(
            &env,
            &config,
            sale_id,
            registry,
            buyer,
            gross_amount,
            referral_code,
        )
    }

    // ── Read-only queries ───────────────────────────────────────────

    pub fn get_settlement(env: Env, sale_id: String) -> Option<SettlementRecord> {
        settlement::get(&env, &sale_id)
    }

    pub fn get_settlement_at(env: Env, seq: u64) -> Option<SettlementRecord> {
        settlement::get_at(&env, seq)
    }

    pub fn get_settlement_count(env: Env) -> u64 {
        settlement::count(&env)
    }

    /// Settlements credited to `affiliate`, oldest first.
    pub fn get_affiliate_settlements(
        env: Env,
        affiliate: Address,
        start: u64,
        limit: u32,
    ) -> Vec<SettlementRecord> {
        settlement::for_affiliate(&env, &affiliate, start, limit)
    }

    /// Settlements with `from_ts <= settled_at <= to_ts`, paged by log cursor.
    pub fn get_settlements_in_range(
        env: Env,
        from_ts: u64,
        to_ts: u64,
        cursor: u64,
        limit: u32,
    ) -> (Vec<SettlementRecord>, u64) {
        settlement::in_range(&env, from_ts, to_ts, cursor, limit)
    }

    pub fn is_settlement_locked(env: Env, affiliate: Address) -> bool {
        settlement::is_locked(&env, &affiliate)
    }

    pub fn get_tier_policy(env: Env) -> Vec<TierBand> {
        tiers::bands(&env)
    }

    pub fn get_config(env: Env) -> Result<EngineConfig, SettlementError> {
        load_config(&env)
    }

    pub fn is_admin(env: Env, account: Address) -> bool {
        access_control::has_role(&env, &account, ROLE_ADMIN)
    }

    pub fn get_admins(env: Env) -> Vec<Address> {
        access_control::get_role_holders(&env)
    }
}
