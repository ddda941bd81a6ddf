//! # Affiliate Ledger and Referral Code Index
//!
//! One [`AffiliateRecord`] per identity, created by registration and never
//! deleted. Each record owns exactly one referral code, and the index maps
//! every assigned code back to its owner.
//!
//! ## Referral codes
//!
//! - A preferred code is 3 to 20 ASCII alphanumerics.
//! - Codes are canonicalized to upper case before storage and lookup, so
//!   `alice`, `Alice` and `ALICE` are the same code.
//! - If the canonical code is taken, registration tries `CODE-2`,
//!   `CODE-3`, ... up to [`MAX_SUFFIX_ATTEMPTS`] variants, then fails with
//!   `CodeSpaceExhausted`. Suffixed codes contain `-`, which preferred codes
//!   cannot, so a suffixed code never shadows a future preferred one.
//! - Codes are immutable once assigned.

use soroban_sdk::{contracttype, Address, Env, String};

use crate::errors::SettlementError;
use crate::tiers;
use crate::DataKey;

pub const MIN_CODE_LEN: u32 = 3;
pub const MAX_CODE_LEN: u32 = 20;
/// Number of suffixed variants tried after the bare code is found taken.
pub const MAX_SUFFIX_ATTEMPTS: u32 = 99;
const FIRST_SUFFIX: u32 = 2;
/// Longest string `resolve` will consider: a max-length code plus `-100`.
const MAX_RESOLVABLE_LEN: usize = 32;

const PERSISTENT_LIFETIME_THRESHOLD: u32 = 120_960;
const PERSISTENT_BUMP_AMOUNT: u32 = 1_051_200;

#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct AffiliateRecord {
    pub affiliate: Address,
    /// Inactive affiliates keep their history but earn nothing.
    pub is_active: bool,
    pub tier: u32,
    pub total_sales: i128,
    pub total_commissions: i128,
    /// Number of settled sales attributed to this affiliate.
    pub referral_count: u64,
    pub referral_code: String,
    pub registered_at: u64,
}

// ════════════════════════════════════════════════════════════════════
//  Code handling
// ════════════════════════════════════════════════════════════════════

/// Validate a preferred code and return its canonical bytes.
fn canonical_code(code: &String) -> Result<([u8; MAX_RESOLVABLE_LEN], usize), SettlementError> {
    let len = code.len();
    if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&len) {
        return Err(SettlementError::InvalidCode);
    }
    let len = len as usize;
    let mut buf = [0u8; MAX_RESOLVABLE_LEN];
    code.copy_into_slice(&mut buf[..len]);
    for byte in buf[..len].iter_mut() {
        if !byte.is_ascii_alphanumeric() {
            return Err(SettlementError::InvalidCode);
        }
        byte.make_ascii_uppercase();
    }
    Ok((buf, len))
}

/// Canonical form of a code presented at settlement, or `None` if it could
/// never have been assigned.
fn canonical_lookup(env: &Env, code: &String) -> Option<String> {
    let len = code.len() as usize;
    if len < MIN_CODE_LEN as usize || len > MAX_RESOLVABLE_LEN {
        return None;
    }
    let mut buf = [0u8; MAX_RESOLVABLE_LEN];
    code.copy_into_slice(&mut buf[..len]);
    for byte in buf[..len].iter_mut() {
        if !(byte.is_ascii_alphanumeric() || *byte == b'-') {
            return None;
        }
        byte.make_ascii_uppercase();
    }
    Some(String::from_bytes(env, &buf[..len]))
}

/// `BASE-n` for a canonical base of at most [`MAX_CODE_LEN`] bytes.
fn suffixed(env: &Env, base: &[u8], n: u32) -> String {
    let mut buf = [0u8; MAX_RESOLVABLE_LEN];
    buf[..base.len()].copy_from_slice(base);
    let mut pos = base.len();
    buf[pos] = b'-';
    pos += 1;

    let mut digits = [0u8; 10];
    let mut count = 0;
    let mut rest = n;
    loop {
        digits[count] = b'0' + (rest % 10) as u8;
        count += 1;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    for digit in digits[..count].iter().rev() {
        buf[pos] = *digit;
        pos += 1;
    }
    String::from_bytes(env, &buf[..pos])
}

fn code_taken(env: &Env, code: &String) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::ReferralCode(code.clone()))
}

/// First free code among `BASE`, `BASE-2`, ..., `BASE-100`.
fn first_free_code(env: &Env, base: &[u8]) -> Result<String, SettlementError> {
    let bare = String::from_bytes(env, base);
    if !code_taken(env, &bare) {
        return Ok(bare);
    }
    for n in FIRST_SUFFIX..FIRST_SUFFIX + MAX_SUFFIX_ATTEMPTS {
        let candidate = suffixed(env, base, n);
        if !code_taken(env, &candidate) {
            return Ok(candidate);
        }
    }
    Err(SettlementError::CodeSpaceExhausted)
}

// ════════════════════════════════════════════════════════════════════
//  Ledger
// ════════════════════════════════════════════════════════════════════

pub fn get(env: &Env, affiliate: &Address) -> Option<AffiliateRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Affiliate(affiliate.clone()))
}

pub fn write(env: &Env, record: &AffiliateRecord) {
    let key = DataKey::Affiliate(record.affiliate.clone());
    env.storage().persistent().set(&key, record);
    env.storage().persistent().extend_ttl(
        &key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

/// Create the record and its index entry together. Returns the assigned
/// code, which differs from `preferred` whenever a suffix was needed.
pub fn register(
    env: &Env,
    affiliate: &Address,
    preferred: &String,
) -> Result<String, SettlementError> {
    if get(env, affiliate).is_some() {
        return Err(SettlementError::AlreadyRegistered);
    }
    let (buf, len) = canonical_code(preferred)?;
    let code = first_free_code(env, &buf[..len])?;

    let record = AffiliateRecord {
        affiliate: affiliate.clone(),
        is_active: true,
        tier: 0,
        total_sales: 0,
        total_commissions: 0,
        referral_count: 0,
        referral_code: code.clone(),
        registered_at: env.ledger().timestamp(),
    };
    write(env, &record);

    let index_key = DataKey::ReferralCode(code.clone());
    env.storage().persistent().set(&index_key, affiliate);
    env.storage().persistent().extend_ttl(
        &index_key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );

    Ok(code)
}

/// Owner of `code`, regardless of the owner's activation state.
pub fn resolve(env: &Env, code: &String) -> Option<Address> {
    let canonical = canonical_lookup(env, code)?;
    env.storage()
        .persistent()
        .get(&DataKey::ReferralCode(canonical))
}

/// Returns the previous flag.
pub fn set_active(env: &Env, affiliate: &Address, active: bool) -> Result<bool, SettlementError> {
    let mut record = get(env, affiliate).ok_or(SettlementError::NotFound)?;
    let previous = record.is_active;
    if previous != active {
        record.is_active = active;
        write(env, &record);
    }
    Ok(previous)
}

/// Fold one settled sale into the record's statistics. The tier only ever
/// moves up. Nothing is written; the caller persists the record.
pub fn apply_sale(
    record: &mut AffiliateRecord,
    gross_amount: i128,
    commission: i128,
) -> Result<(), SettlementError> {
    record.total_sales = record
        .total_sales
        .checked_add(gross_amount)
        .ok_or(SettlementError::InvalidAmount)?;
    record.total_commissions = record
        .total_commissions
        .checked_add(commission)
        .ok_or(SettlementError::InvalidAmount)?;
    record.referral_count += 1;
    record.tier = record.tier.max(tiers::tier_for(record.total_sales));
    Ok(())
}
