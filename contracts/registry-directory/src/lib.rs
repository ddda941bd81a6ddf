//! # Registry Directory Contract
//!
//! Administrator-curated list of the domain registries whose sale reports the
//! affiliate settlement engine is willing to honor. A registry is identified by
//! the address of its contract.
//!
//! ## Entry Lifecycle
//!
//! ```text
//! [Active] ──deactivate──> [Inactive]
//! ```
//!
//! Entries are never removed. Deactivation only flips the `active` flag so the
//! directory keeps a complete history of every registry it ever trusted.
//!
//! ## Security
//!
//! Only the admin and addresses holding the governance role can add or
//! deactivate registries. The admin alone grants and revokes governance.

#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, String,
    Symbol, Vec,
};


/// Upper bound on a registry display name, in bytes.
pub const MAX_NAME_LEN: u32 = 64;

const PERSISTENT_LIFETIME_THRESHOLD: u32 = 120_960;
const PERSISTENT_BUMP_AMOUNT: u32 = 1_051_200;

// ════════════════════════════════════════════════════════════════════
//  Errors
// ════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    /// `initialize` has not been called.
    NotInitialized = 1,
    /// `initialize` was already called.
    AlreadyInitialized = 2,
    /// Caller is neither the admin nor a governance holder.
    Unauthorized = 3,
    /// The registry identity is already listed.
    AlreadyRegistered = 4,
    /// The registry identity is not listed.
    NotFound = 5,
    /// Display name is empty or longer than [`MAX_NAME_LEN`].
    InvalidName = 6,
}

// ════════════════════════════════════════════════════════════════════
//  Storage Types
// ════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Contract administrator
    Admin,
    /// Registry entry by registry address
    Registry(Address),
    /// All registry addresses in insertion order
    RegistryList,
    /// Addresses allowed to manage entries besides the admin
    GovernanceRole(Address),
}

/// Directory entry for one sale-originating registry.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryEntry {
    /// Address of the registry contract
    pub registry: Address,
    /// Human-readable name (e.g. "DigitalGiantRegistry")
    pub name: String,
    /// Only active registries may report sales
    pub active: bool,
    /// Ledger timestamp when the entry was added
    pub added_at: u64,
    /// Ledger timestamp of the last status change
    pub updated_at: u64,
    /// Address that added the entry
    pub added_by: Address,
}

// ════════════════════════════════════════════════════════════════════
//  Events
// ════════════════════════════════════════════════════════════════════

const TOPIC_REGISTRY_ADDED: Symbol = symbol_short!("reg_add");
const TOPIC_REGISTRY_DEACTIVATED: Symbol = symbol_short!("reg_off");

#[contracttype]
#[derive(Clone, Debug)]
pub struct RegistryAddedEvent {
    pub registry: Address,
    pub name: String,
    pub changed_by: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RegistryDeactivatedEvent {
    pub registry: Address,
    pub changed_by: Address,
}

// ════════════════════════════════════════════════════════════════════
//  Contract Implementation
// ════════════════════════════════════════════════════════════════════

#[contract]
pub struct RegistryDirectoryContract;

#[contractimpl]
impl RegistryDirectoryContract {
    // ── Initialization ──────────────────────────────────────────────

    /// Initialize the directory with an admin address.
    ///
    /// The caller must authorize as `admin`.
    pub fn initialize(env: Env, admin: Address) -> Result<(), RegistryError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(RegistryError::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::GovernanceRole(admin), &true);
        Ok(())
    }

    // ── Admin Set ───────────────────────────────────────────────────

    /// Grant the governance role to `account`. Admin only.
    pub fn grant_governance(env: Env, admin: Address, account: Address) -> Result<(), RegistryError> {
        Self::require_admin(&env, &admin)?;
        env.storage()
            .instance()
            .set(&DataKey::GovernanceRole(account), &true);
        Ok(())
    }

    /// Revoke the governance role from `account`. Admin only.
    pub fn revoke_governance(env: Env, admin: Address, account: Address) -> Result<(), RegistryError> {
        Self::require_admin(&env, &admin)?;
        env.storage()
            .instance()
            .set(&DataKey::GovernanceRole(account), &false);
        Ok(())
    }

    // ── Registry Management ─────────────────────────────────────────

    /// List a new registry as active.
    ///
    /// * `caller` - Must be the admin or hold the governance role
    /// * `registry` - Address of the registry contract
    /// * `name` - Display name, 1 to [`MAX_NAME_LEN`] bytes
    pub fn add_registry(
        env: Env,
        caller: Address,
        registry: Address,
        name: String,
    ) -> Result<(), RegistryError> {
        Self::require_governance(&env, &caller)?;

        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(RegistryError::InvalidName);
        }

        let key = DataKey::Registry(registry.clone());
        if env.storage().persistent().has(&key) {
            return Err(RegistryError::AlreadyRegistered);
        }

        let now = env.ledger().timestamp();
        let entry = RegistryEntry {
            registry: registry.clone(),
            name: name.clone(),
            active: true,
            added_at: now,
            updated_at: now,
            added_by: caller.clone(),
        };
        Self::write_entry(&env, &entry);

        let mut registries = Self::get_all_registries(env.clone());
        registries.push_back(registry.clone());
        env.storage()
            .persistent()
            .set(&DataKey::RegistryList, &registries);
        env.storage().persistent().extend_ttl(
            &DataKey::RegistryList,
            PERSISTENT_LIFETIME_THRESHOLD,
            PERSISTENT_BUMP_AMOUNT,
        );

        env.events().publish(
            (TOPIC_REGISTRY_ADDED,),
            RegistryAddedEvent {
                registry,
                name,
                changed_by: caller,
            },
        );
        Ok(())
    }

    /// Stop honoring sales from `registry`.
    ///
    /// Deactivating an already inactive registry is a no-op and emits nothing.
    pub fn deactivate_registry(
        env: Env,
        caller: Address,
        registry: Address,
    ) -> Result<(), RegistryError> {
        Self::require_governance(&env, &caller)?;

        let mut entry = Self::get_registry(env.clone(), registry.clone())
            .ok_or(RegistryError::NotFound)?;
        if !entry.active {
            return Ok(());
        }

        entry.active = false;
        entry.updated_at = env.ledger().timestamp();
        Self::write_entry(&env, &entry);

        env.events().publish(
            (TOPIC_REGISTRY_DEACTIVATED,),
            RegistryDeactivatedEvent {
                registry,
                changed_by: caller,
            },
        );
        Ok(())
    }

    // ── Query Functions ─────────────────────────────────────────────

    /// Get a registry entry.
    pub fn get_registry(env: Env, registry: Address) -> Option<RegistryEntry> {
        env.storage()
            .persistent()
            .get(&DataKey::Registry(registry))
    }

    /// True only if the registry is listed and active. Unknown registries are inactive.
    pub fn is_active(env: Env, registry: Address) -> bool {
        Self::get_registry(env, registry).is_some_and(|entry| entry.active)
    }

    /// All listed registries, active or not, in insertion order.
    pub fn get_all_registries(env: Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::RegistryList)
            .unwrap_or_else(|| Vec::new(&env))
    }

    /// Registries currently allowed to report sales.
    pub fn get_active_registries(env: Env) -> Vec<Address> {
        let mut active = Vec::new(&env);
        for registry in Self::get_all_registries(env.clone()).iter() {
            if Self::is_active(env.clone(), registry.clone()) {
                active.push_back(registry);
            }
        }
        active
    }

    pub fn get_admin(env: Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(RegistryError::NotInitialized)
    }

    pub fn has_governance(env: Env, account: Address) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::GovernanceRole(account))
            .unwrap_or(false)
    }

    // ── Internal Helpers ────────────────────────────────────────────

    fn write_entry(env: &Env, entry: &RegistryEntry) {
        let key = DataKey::Registry(entry.registry.clone());
        env.storage().persistent().set(&key, entry);
        env.storage().persistent().extend_ttl(
            &key,
            PERSISTENT_LIFETIME_THRESHOLD,
            PERSISTENT_BUMP_AMOUNT,
        );
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), RegistryError> {
        caller.require_auth();
        let admin = Self::get_admin(env.clone())?;
        if *caller != admin {
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }

    /// The admin always passes, whatever its own governance flag says.
    fn require_governance(env: &Env, caller: &Address) -> Result<(), RegistryError> {
        caller.require_auth();
        let admin = Self::get_admin(env.clone())?;
        if *caller != admin && !Self::has_governance(env.clone(), caller.clone()) {
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }
}
