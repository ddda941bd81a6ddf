//! # Atomic Settlement
//!
//! Turns one registry-reported sale into a treasury/affiliate split, the
//! matching affiliate ledger update and an immutable settlement record.
//!
//! ## Order of checks
//!
//! 1. Sale id is non-empty and has never been settled (`DuplicateSale`).
//! 2. The reporting registry is listed and active in the directory.
//! 3. Gross amount is positive.
//! 4. A presented referral code resolves (`UnknownReferralCode`). An inactive
//!    owner is treated as no affiliate, never as a failure.
//! 5. Commission at the rate for the affiliate's post-sale cumulative sales,
//!    rounded down in the treasury's favor.
//! 6. Treasury and affiliate transfers.
//! 7. Affiliate statistics and tier, written only after both transfers
//!    committed.
//! 8. Settlement record appended.
//!
//! Every failure is returned as an error, which aborts the whole invocation:
//! transfers already made by the token, ledger writes, the log and events are
//! all discarded together.
//!
//! Steps 5 to 7 run inside a per-affiliate critical section held in temporary
//! storage. A nested call that reaches `settle` for the same affiliate before
//! the first one finished is refused with `SettlementInProgress`.

use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::affiliates::{self, AffiliateRecord};
use crate::errors::SettlementError;
use crate::registry_import::RegistryDirectoryContractClient;
use crate::{events, tiers, transfer, DataKey, EngineConfig};
use giant_common::bps;

/// Page size cap for log queries.
pub const MAX_PAGE_LIMIT: u32 = 50;

const PERSISTENT_LIFETIME_THRESHOLD: u32 = 120_960;
const PERSISTENT_BUMP_AMOUNT: u32 = 1_051_200;

/// Append-only audit record of one settled sale.
///
/// `commission + net_treasury == gross_amount` always holds, and
/// `commission == 0` whenever `affiliate` is `None`.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementRecord {
    /// Position in the settlement log
    pub seq: u64,
    /// Registry-supplied sale identifier, unique across the log
    pub sale_id: String,
    pub registry: Address,
    pub buyer: Address,
    pub gross_amount: i128,
    /// Code as presented by the buyer, if any
    pub referral_code: Option<String>,
    /// Active affiliate credited with the sale
    pub affiliate: Option<Address>,
    pub commission: i128,
    pub net_treasury: i128,
    /// Affiliate tier the rate was taken from (0 without an affiliate)
    pub tier: u32,
    /// Commission rate applied (0 without an affiliate)
    pub rate_bps: u32,
    /// Ledger timestamp
    pub settled_at: u64,
}

struct Split {
    affiliate: Option<Address>,
    commission: i128,
    net_treasury: i128,
    tier: u32,
    rate_bps: u32,
}

// ════════════════════════════════════════════════════════════════════
//  Settle
// ════════════════════════════════════════════════════════════════════

pub fn settle(
    env: &Env,
    config: &EngineConfig,
    sale_id: String,
    registry: Address,
    buyer: Address,
    gross_amount: i128,
    referral_code: Option<String>,
) -> Result<SettlementRecord, SettlementError> {
    registry.require_auth();
    buyer.require_auth();

    if sale_id.is_empty() {
        return Err(SettlementError::InvalidSaleId);
    }
    if env
        .storage()
        .persistent()
        .has(&DataKey::Settlement(sale_id.clone()))
    {
        return Err(SettlementError::DuplicateSale);
    }
    require_active_registry(env, &config.registry_directory, &registry)?;
    if gross_amount <= 0 {
        return Err(SettlementError::InvalidAmount);
    }

    let referrer = match &referral_code {
        Some(code) => resolve_referrer(env, code)?,
        None => None,
    };

    let seq = next_seq(env);
    let split = match referrer {
        Some(record) => settle_with_affiliate(env, config, &buyer, gross_amount, record, seq)?,
        None => {
            transfer::pay(
                env,
                &config.payment_token,
                &buyer,
                &config.treasury,
                gross_amount,
            )?;
            Split {
                affiliate: None,
                commission: 0,
                net_treasury: gross_amount,
                tier: 0,
                rate_bps: 0,
            }
        }
    };

    let record = SettlementRecord {
        seq,
        sale_id,
        registry,
        buyer,
        gross_amount,
        referral_code,
        affiliate: split.affiliate,
        commission: split.commission,
        net_treasury: split.net_treasury,
        tier: split.tier,
        rate_bps: split.rate_bps,
        settled_at: env.ledger().timestamp(),
    };
    append_record(env, &record);
    events::emit_settled(env, &record);
    Ok(record)
}

fn require_active_registry(
    env: &Env,
    directory: &Address,
    registry: &Address,
) -> Result<(), SettlementError> {
    let client = RegistryDirectoryContractClient::new(env, directory);
    match client.get_registry(registry) {
        None => Err(SettlementError::UnknownRegistry),
        Some(entry) if !entry.active => Err(SettlementError::InactiveRegistry),
        Some(_) => Ok(()),
    }
}

/// Active owner of `code`; `None` if the owner is deactivated.
fn resolve_referrer(env: &Env, code: &String) -> Result<Option<AffiliateRecord>, SettlementError> {
    let owner = affiliates::resolve(env, code).ok_or(SettlementError::UnknownReferralCode)?;
    let record = affiliates::get(env, &owner).ok_or(SettlementError::UnknownReferralCode)?;
    Ok(if record.is_active { Some(record) } else { None })
}

fn settle_with_affiliate(
    env: &Env,
    config: &EngineConfig,
    buyer: &Address,
    gross_amount: i128,
    mut record: AffiliateRecord,
    seq: u64,
) -> Result<Split, SettlementError> {
    let affiliate = record.affiliate.clone();
    lock(env, &affiliate)?;

    let post_sale_total = record
        .total_sales
        .checked_add(gross_amount)
        .ok_or(SettlementError::InvalidAmount)?;
    let rate_bps = tiers::rate_for(post_sale_total);
    let tier = tiers::tier_for(post_sale_total);
    let (commission, net_treasury) =
        bps::split_floor(gross_amount, rate_bps).ok_or(SettlementError::InvalidAmount)?;

    transfer::pay(env, &config.payment_token, buyer, &config.treasury, net_treasury)?;
    transfer::pay(env, &config.payment_token, buyer, &affiliate, commission)?;

    let old_tier = record.tier;
    affiliates::apply_sale(&mut record, gross_amount, commission)?;
    affiliates::write(env, &record);
    index_affiliate_sale(env, &affiliate, record.referral_count - 1, seq);

    unlock(env, &affiliate);

    if record.tier > old_tier {
        events::emit_tier_upgraded(env, &affiliate, old_tier, record.tier, record.total_sales);
    }

    Ok(Split {
        affiliate: Some(affiliate),
        commission,
        net_treasury,
        tier,
        rate_bps,
    })
}

// ════════════════════════════════════════════════════════════════════
//  Per-affiliate critical section
// ════════════════════════════════════════════════════════════════════

fn lock(env: &Env, affiliate: &Address) -> Result<(), SettlementError> {
    let key = DataKey::AffiliateLock(affiliate.clone());
    if env.storage().temporary().has(&key) {
        return Err(SettlementError::SettlementInProgress);
    }
    env.storage().temporary().set(&key, &true);
    Ok(())
}

fn unlock(env: &Env, affiliate: &Address) {
    env.storage()
        .temporary()
        .remove(&DataKey::AffiliateLock(affiliate.clone()));
}

pub fn is_locked(env: &Env, affiliate: &Address) -> bool {
    env.storage()
        .temporary()
        .has(&DataKey::AffiliateLock(affiliate.clone()))
}

// ════════════════════════════════════════════════════════════════════
//  Settlement log
// ════════════════════════════════════════════════════════════════════

fn next_seq(env: &Env) -> u64 {
    env.storage().instance().get(&DataKey::NextSeq).unwrap_or(0)
}

fn extend(env: &Env, key: &DataKey) {
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

fn append_record(env: &Env, record: &SettlementRecord) {
    let key = DataKey::Settlement(record.sale_id.clone());
    env.storage().persistent().set(&key, record);
    extend(env, &key);

    let seq_key = DataKey::SettlementAt(record.seq);
    env.storage().persistent().set(&seq_key, &record.sale_id);
    extend(env, &seq_key);

    env.storage()
        .instance()
        .set(&DataKey::NextSeq, &(record.seq + 1));
}

fn index_affiliate_sale(env: &Env, affiliate: &Address, idx: u64, seq: u64) {
    let key = DataKey::AffiliateSale(affiliate.clone(), idx);
    env.storage().persistent().set(&key, &seq);
    extend(env, &key);
}

pub fn count(env: &Env) -> u64 {
    next_seq(env)
}

pub fn get(env: &Env, sale_id: &String) -> Option<SettlementRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Settlement(sale_id.clone()))
}

pub fn get_at(env: &Env, seq: u64) -> Option<SettlementRecord> {
    let sale_id: String = env
        .storage()
        .persistent()
        .get(&DataKey::SettlementAt(seq))?;
    get(env, &sale_id)
}

/// Records credited to `affiliate`, oldest first, starting at the
/// affiliate's `start`-th credited sale.
pub fn for_affiliate(
    env: &Env,
    affiliate: &Address,
    start: u64,
    limit: u32,
) -> Vec<SettlementRecord> {
    let mut out = Vec::new(env);
    let credited = affiliates::get(env, affiliate).map_or(0, |r| r.referral_count);
    let end = credited.min(start.saturating_add(limit.min(MAX_PAGE_LIMIT) as u64));
    for idx in start..end {
        let seq: Option<u64> = env
            .storage()
            .persistent()
            .get(&DataKey::AffiliateSale(affiliate.clone(), idx));
        if let Some(record) = seq.and_then(|seq| get_at(env, seq)) {
            out.push_back(record);
        }
    }
    out
}

/// First log position whose record was settled at or after `from_ts`.
/// Ledger timestamps never decrease, so the log is sorted by time.
fn lower_bound(env: &Env, from_ts: u64) -> u64 {
    let mut lo = 0u64;
    let mut hi = count(env);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let settled_at = get_at(env, mid).map_or(u64::MAX, |r| r.settled_at);
        if settled_at < from_ts {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Records with `from_ts <= settled_at <= to_ts`, resuming at `cursor`.
///
/// Returns the page and the cursor for the next call. Once the window is
/// exhausted the returned cursor equals the log length.
pub fn in_range(
    env: &Env,
    from_ts: u64,
    to_ts: u64,
    cursor: u64,
    limit: u32,
) -> (Vec<SettlementRecord>, u64) {
    let mut out = Vec::new(env);
    let total = count(env);
    if from_ts > to_ts {
        return (out, total);
    }
    let limit = limit.min(MAX_PAGE_LIMIT);
    let mut pos = cursor.max(lower_bound(env, from_ts));
    while pos < total && out.len() < limit {
        let Some(record) = get_at(env, pos) else {
            break;
        };
        if record.settled_at > to_ts {
            pos = total;
            break;
        }
        out.push_back(record);
        pos += 1;
    }
    (out, pos)
}
