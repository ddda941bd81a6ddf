//! # Affiliate Registration Tests
//!
//! Registration, referral code canonicalization and collision handling, and
//! the activation switch.

extern crate alloc;

use super::*;
use crate::test_support::{s, setup, usd};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, Env};

// ════════════════════════════════════════════════════════════════════
//  Registration
// ════════════════════════════════════════════════════════════════════

#[test]
fn test_register_affiliate_initial_record() {
    let t = setup();
    let (affiliate, code) = t.affiliate("ALICE");
    assert_eq!(code, s(&t.env, "ALICE"));

    let record = t.client.get_affiliate(&affiliate);
    assert_eq!(record.affiliate, affiliate);
    assert!(record.is_active);
    assert_eq!(record.tier, 0);
    assert_eq!(record.total_sales, 0);
    assert_eq!(record.total_commissions, 0);
    assert_eq!(record.referral_count, 0);
    assert_eq!(record.referral_code, code);
}

#[test]
fn test_register_canonicalizes_to_upper_case() {
    let t = setup();
    let (affiliate, code) = t.affiliate("alice42");
    assert_eq!(code, s(&t.env, "ALICE42"));
    assert_eq!(t.client.resolve_referral_code(&s(&t.env, "Alice42")), Some(affiliate));
}

#[test]
fn test_register_twice_fails() {
    let t = setup();
    let (affiliate, _) = t.affiliate("ALICE");
    let result = t.client.try_register_affiliate(&affiliate, &s(&t.env, "OTHER"));
    assert_eq!(result, Err(Ok(SettlementError::AlreadyRegistered)));
    assert!(t.client.resolve_referral_code(&s(&t.env, "OTHER")).is_none());
}

#[test]
fn test_register_rejects_invalid_codes() {
    let t = setup();
    let affiliate = Address::generate(&t.env);
    for bad in [
        "AB",
        "ABCDEFGHIJKLMNOPQRSTU",
        "AL-CE",
        "ALI CE",
        "alice!",
        "",
    ] {
        let result = t.client.try_register_affiliate(&affiliate, &s(&t.env, bad));
        assert_eq!(result, Err(Ok(SettlementError::InvalidCode)));
    }
    assert_eq!(
        t.client.try_get_affiliate(&affiliate),
        Err(Ok(SettlementError::NotFound))
    );
}

#[test]
fn test_register_accepts_length_bounds() {
    let t = setup();
    let (_, short) = t.affiliate("ab1");
    let (_, long) = t.affiliate("ABCDEFGHIJKLMNOPQRST");
    assert_eq!(short, s(&t.env, "AB1"));
    assert_eq!(long, s(&t.env, "ABCDEFGHIJKLMNOPQRST"));
}

#[test]
fn test_register_before_initialize_fails() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(AffiliateSettlementContract, ());
    let client = AffiliateSettlementContractClient::new(&env, &contract_id);
    let result = client.try_register_affiliate(&Address::generate(&env), &s(&env, "ALICE"));
    assert_eq!(result, Err(Ok(SettlementError::NotInitialized)));
}

// ════════════════════════════════════════════════════════════════════
//  Code collisions
// ════════════════════════════════════════════════════════════════════

#[test]
fn test_colliding_codes_get_suffixes() {
    let t = setup();
    let (first, c1) = t.affiliate("ALICE");
    let (second, c2) = t.affiliate("ALICE");
    let (third, c3) = t.affiliate("alice");

    assert_eq!(c1, s(&t.env, "ALICE"));
    assert_eq!(c2, s(&t.env, "ALICE-2"));
    assert_eq!(c3, s(&t.env, "ALICE-3"));

    assert_eq!(t.client.resolve_referral_code(&c1), Some(first));
    assert_eq!(t.client.resolve_referral_code(&c2), Some(second.clone()));
    assert_eq!(t.client.resolve_referral_code(&s(&t.env, "alice-3")), Some(third));
    assert_eq!(t.client.get_affiliate(&second).referral_code, c2);
}

#[test]
fn test_suffix_skips_taken_variants() {
    let t = setup();
    t.affiliate("BOB");
    t.affiliate("BOB");
    // A third and fourth registrant must never reuse BOB or BOB-2.
    let (_, c3) = t.affiliate("Bob");
    let (_, c4) = t.affiliate("bob");
    assert_eq!(c3, s(&t.env, "BOB-3"));
    assert_eq!(c4, s(&t.env, "BOB-4"));
}

#[test]
fn test_code_space_exhausted() {
    let t = setup();
    t.env.as_contract(&t.contract_id, || {
        let owner = Address::generate(&t.env);
        t.env
            .storage()
            .persistent()
            .set(&DataKey::ReferralCode(s(&t.env, "CAROL")), &owner);
        for n in 2..=100u32 {
            let code = alloc::format!("CAROL-{}", n);
            t.env
                .storage()
                .persistent()
                .set(&DataKey::ReferralCode(s(&t.env, &code)), &owner);
        }
    });

    let affiliate = Address::generate(&t.env);
    let result = t.client.try_register_affiliate(&affiliate, &s(&t.env, "carol"));
    assert_eq!(result, Err(Ok(SettlementError::CodeSpaceExhausted)));
    assert_eq!(
        t.client.try_get_affiliate(&affiliate),
        Err(Ok(SettlementError::NotFound))
    );
}

#[test]
fn test_last_suffix_is_still_assignable() {
    let t = setup();
    t.env.as_contract(&t.contract_id, || {
        let owner = Address::generate(&t.env);
        t.env
            .storage()
            .persistent()
            .set(&DataKey::ReferralCode(s(&t.env, "DAVE")), &owner);
        for n in 2..=99u32 {
            let code = alloc::format!("DAVE-{}", n);
            t.env
                .storage()
                .persistent()
                .set(&DataKey::ReferralCode(s(&t.env, &code)), &owner);
        }
    });

    let (_, code) = t.affiliate("DAVE");
    assert_eq!(code, s(&t.env, "DAVE-100"));
}

#[test]
fn test_resolve_unknown_or_malformed_code() {
    let t = setup();
    t.affiliate("ALICE");
    assert!(t.client.resolve_referral_code(&s(&t.env, "NOBODY")).is_none());
    assert!(t.client.resolve_referral_code(&s(&t.env, "AL")).is_none());
    assert!(t.client.resolve_referral_code(&s(&t.env, "ALICE ")).is_none());
    assert!(t
        .client
        .resolve_referral_code(&s(&t.env, "ALICEALICEALICEALICEALICEALICEALICE"))
        .is_none());
}

// ════════════════════════════════════════════════════════════════════
//  Activation
// ════════════════════════════════════════════════════════════════════

#[test]
fn test_deactivate_keeps_history() {
    let t = setup();
    let (affiliate, _) = t.affiliate("ALICE");
    let buyer = t.funded_buyer(usd(1_000));
    t.settle("S1", &buyer, usd(1_000), Some("ALICE"));

    t.client.set_affiliate_active(&t.admin, &affiliate, &false);

    let record = t.client.get_affiliate(&affiliate);
    assert!(!record.is_active);
    assert_eq!(record.total_sales, usd(1_000));
    assert_eq!(record.total_commissions, usd(50));
    assert_eq!(record.referral_count, 1);
    // The code stays reserved for its owner.
    assert_eq!(t.client.resolve_referral_code(&s(&t.env, "ALICE")), Some(affiliate));
}

#[test]
fn test_reactivate_affiliate() {
    let t = setup();
    let (affiliate, _) = t.affiliate("ALICE");
    t.client.set_affiliate_active(&t.admin, &affiliate, &false);
    t.client.set_affiliate_active(&t.admin, &affiliate, &true);
    assert!(t.client.get_affiliate(&affiliate).is_active);
}

#[test]
fn test_set_active_requires_admin() {
    let t = setup();
    let (affiliate, _) = t.affiliate("ALICE");
    let outsider = Address::generate(&t.env);
    let result = t.client.try_set_affiliate_active(&outsider, &affiliate, &false);
    assert_eq!(result, Err(Ok(SettlementError::Unauthorized)));
    assert!(t.client.get_affiliate(&affiliate).is_active);
}

#[test]
fn test_set_active_unknown_affiliate() {
    let t = setup();
    let stranger = Address::generate(&t.env);
    let result = t.client.try_set_affiliate_active(&t.admin, &stranger, &false);
    assert_eq!(result, Err(Ok(SettlementError::NotFound)));
}

#[test]
fn test_get_affiliate_never_registered() {
    let t = setup();
    let result = t.client.try_get_affiliate(&Address::generate(&t.env));
    assert_eq!(result, Err(Ok(SettlementError::NotFound)));
}
