//! # Admin Capability
//!
//! The engine has no ambient owner. Admin rights are a role held by explicit
//! addresses, and every admin operation takes the acting address as an
//! argument and checks it here. Separate engine instances therefore carry
//! fully independent admin sets.
//!
//! Roles are stored per address as a bitmap so further roles can be added
//! without a storage migration.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::errors::SettlementError;

/// May toggle affiliates, re-point the treasury and manage other admins.
pub const ROLE_ADMIN: u32 = 1 << 0;

#[contracttype]
#[derive(Clone)]
pub enum AccessControlKey {
    /// Role bitmap for an address
    Roles(Address),
    /// Every address currently holding a role
    RoleHolders,
}

pub fn get_roles(env: &Env, account: &Address) -> u32 {
    env.storage()
        .instance()
        .get(&AccessControlKey::Roles(account.clone()))
        .unwrap_or(0)
}

fn set_roles(env: &Env, account: &Address, roles: u32) {
    env.storage()
        .instance()
        .set(&AccessControlKey::Roles(account.clone()), &roles);

    let holders = get_role_holders(env);
    let mut updated = Vec::new(env);
    for holder in holders.iter() {
        if holder != *account {
            updated.push_back(holder);
        }
    }
    if roles != 0 {
        updated.push_back(account.clone());
    }
    env.storage()
        .instance()
        .set(&AccessControlKey::RoleHolders, &updated);
}

pub fn has_role(env: &Env, account: &Address, role: u32) -> bool {
    (get_roles(env, account) & role) != 0
}

pub fn grant_role(env: &Env, account: &Address, role: u32) {
    let current = get_roles(env, account);
    set_roles(env, account, current | role);
}

pub fn revoke_role(env: &Env, account: &Address, role: u32) {
    let current = get_roles(env, account);
    set_roles(env, account, current & !role);
}

pub fn get_role_holders(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&AccessControlKey::RoleHolders)
        .unwrap_or_else(|| Vec::new(env))
}

/// Number of addresses currently holding ADMIN.
pub fn admin_count(env: &Env) -> u32 {
    get_role_holders(env)
        .iter()
        .filter(|holder| has_role(env, holder, ROLE_ADMIN))
        .count() as u32
}

/// Authenticate `caller` and require the ADMIN role.
pub fn require_admin(env: &Env, caller: &Address) -> Result<(), SettlementError> {
    caller.require_auth();
    if !has_role(env, caller, ROLE_ADMIN) {
        return Err(SettlementError::Unauthorized);
    }
    Ok(())
}
