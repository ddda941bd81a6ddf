//! Shared fixtures for the engine test modules.

use super::*;
use crate::tiers::UNIT;
use giant_registry_directory::{RegistryDirectoryContract, RegistryDirectoryContractClient};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env, String};

pub struct Setup {
    pub env: Env,
    pub client: AffiliateSettlementContractClient<'static>,
    pub contract_id: Address,
    pub directory: RegistryDirectoryContractClient<'static>,
    pub admin: Address,
    pub treasury: Address,
    pub token: Address,
    /// Active registry listed in the directory
    pub registry: Address,
}

/// Whole dollars in token units.
pub fn usd(dollars: i128) -> i128 {
    dollars * UNIT
}

pub fn s(env: &Env, value: &str) -> String {
    String::from_str(env, value)
}

/// Engine wired to a Stellar asset token and a directory with one active registry.
pub fn setup() -> Setup {
    setup_with_token(|env| {
        let token_admin = Address::generate(env);
        env.register_stellar_asset_contract_v2(token_admin)
            .address()
            .clone()
    })
}

pub fn setup_with_token(make_token: impl FnOnce(&Env) -> Address) -> Setup {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let treasury = Address::generate(&env);
    let token = make_token(&env);

    let directory_id = env.register(RegistryDirectoryContract, ());
    let directory = RegistryDirectoryContractClient::new(&env, &directory_id);
    directory.initialize(&admin);
    let registry = Address::generate(&env);
    directory.add_registry(&admin, &registry, &s(&env, "DigitalGiantRegistry"));

    let contract_id = env.register(AffiliateSettlementContract, ());
    let client = AffiliateSettlementContractClient::new(&env, &contract_id);
    client.initialize(&admin, &treasury, &token, &directory_id);

    Setup {
        env,
        client,
        contract_id,
        directory,
        admin,
        treasury,
        token,
        registry,
    }
}

impl Setup {
    /// New buyer holding `amount` of the payment token.
    pub fn funded_buyer(&self, amount: i128) -> Address {
        let buyer = Address::generate(&self.env);
        StellarAssetClient::new(&self.env, &self.token).mint(&buyer, &amount);
        buyer
    }

    pub fn balance(&self, who: &Address) -> i128 {
        TokenClient::new(&self.env, &self.token).balance(who)
    }

    /// Register a fresh affiliate and return it with its assigned code.
    pub fn affiliate(&self, preferred: &str) -> (Address, String) {
        let affiliate = Address::generate(&self.env);
        let code = self
            .client
            .register_affiliate(&affiliate, &s(&self.env, preferred));
        (affiliate, code)
    }

    pub fn settle(
        &self,
        sale_id: &str,
        buyer: &Address,
        gross: i128,
        code: Option<&str>,
    ) -> SettlementRecord {
        self.client.settle(
            &s(&self.env, sale_id),
            &self.registry,
            buyer,
            &gross,
            &code.map(|c| s(&self.env, c)),
        )
    }
}
