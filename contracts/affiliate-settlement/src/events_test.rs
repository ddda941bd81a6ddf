//! # Events Tests
//!
//! Topic and payload checks for the engine's structured event log.

extern crate alloc;

use super::*;
use crate::events::{
    TOPIC_AFFILIATE_REGISTERED, TOPIC_AFFILIATE_STATUS, TOPIC_ROLE_GRANTED, TOPIC_ROLE_REVOKED,
    TOPIC_SETTLED, TOPIC_TIER_UPGRADED, TOPIC_TREASURY_CHANGED,
};
use crate::test_support::{s, setup, usd};
use soroban_sdk::testutils::{Address as _, Events as _};
use soroban_sdk::{Address, Env, Symbol, TryFromVal};

/// First topic of every recorded event.
fn topics(env: &Env) -> alloc::vec::Vec<Symbol> {
    env.events()
        .all()
        .iter()
        .filter_map(|(_, topics, _)| {
            topics
                .get(0)
                .and_then(|topic| Symbol::try_from_val(env, &topic).ok())
        })
        .collect()
}

fn count(env: &Env, topic: &Symbol) -> usize {
    topics(env).iter().filter(|t| *t == topic).count()
}

fn emitted(env: &Env, topic: &Symbol) -> bool {
    count(env, topic) > 0
}

#[test]
fn test_register_affiliate_emits_event() {
    let t = setup();
    t.affiliate("ALICE");
    assert!(emitted(&t.env, &TOPIC_AFFILIATE_REGISTERED));
}

#[test]
fn test_settle_emits_record() {
    let t = setup();
    let buyer = t.funded_buyer(usd(100));
    let record = t.settle("S1", &buyer, usd(100), None);

    let events = t.env.events().all();
    let (_, _, data) = events
        .iter()
        .find(|(_, topics, _)| {
            topics
                .get(0)
                .and_then(|topic| Symbol::try_from_val(&t.env, &topic).ok())
                == Some(TOPIC_SETTLED)
        })
        .expect("settled event");
    let payload = SettlementRecord::try_from_val(&t.env, &data).unwrap();
    assert_eq!(payload, record);
}

#[test]
fn test_tier_upgrade_emits_event() {
    let t = setup();
    t.affiliate("ALICE");
    let buyer = t.funded_buyer(usd(20_000));

    t.settle("S1", &buyer, usd(5_000), Some("ALICE"));
    assert!(!emitted(&t.env, &TOPIC_TIER_UPGRADED));

    t.settle("S2", &buyer, usd(6_000), Some("ALICE"));
    assert!(emitted(&t.env, &TOPIC_TIER_UPGRADED));
    assert!(emitted(&t.env, &TOPIC_SETTLED));
}

#[test]
fn test_failed_settle_emits_nothing() {
    let t = setup();
    t.affiliate("ALICE");
    let buyer = t.funded_buyer(usd(10));

    let result = t.client.try_settle(
        &s(&t.env, "S1"),
        &t.registry,
        &buyer,
        &usd(1_000),
        &Some(s(&t.env, "ALICE")),
    );
    assert!(result.is_err());
    assert!(!emitted(&t.env, &TOPIC_SETTLED));
    assert!(!emitted(&t.env, &TOPIC_TIER_UPGRADED));
}

#[test]
fn test_status_change_emits_only_on_change() {
    let t = setup();
    let (alice, _) = t.affiliate("ALICE");

    t.client.set_affiliate_active(&t.admin, &alice, &false);
    let after_change = count(&t.env, &TOPIC_AFFILIATE_STATUS);
    assert!(after_change > 0);

    t.client.set_affiliate_active(&t.admin, &alice, &false);
    assert!(count(&t.env, &TOPIC_AFFILIATE_STATUS) <= after_change);
}

#[test]
fn test_admin_changes_emit_events() {
    let t = setup();
    let other = Address::generate(&t.env);

    t.client.grant_admin(&t.admin, &other);
    assert!(emitted(&t.env, &TOPIC_ROLE_GRANTED));

    t.client.revoke_admin(&t.admin, &other);
    assert!(emitted(&t.env, &TOPIC_ROLE_REVOKED));

    t.client.set_treasury(&t.admin, &Address::generate(&t.env));
    assert!(emitted(&t.env, &TOPIC_TREASURY_CHANGED));
}
