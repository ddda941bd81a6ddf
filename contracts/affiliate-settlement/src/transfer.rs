//! Value transfer through the payment token.
//!
//! Soroban token calls either commit or fail as a whole, and a failed call is
//! reported back instead of aborting the settlement outright. Outcomes are
//! classified so callers can tell a refusal from a call that never reached a
//! verdict. Both leave nothing committed once `settle` returns the error.

use soroban_sdk::xdr::ScErrorType;
use soroban_sdk::{token, Address, Env};

use crate::errors::SettlementError;

/// Move `amount` of `token` from `from` to `to`. Zero amounts are skipped.
///
/// * Typed rejection by the token contract → `TransferFailed`
/// * Trap, abort or host failure inside the token → `TransferTimeout`
pub fn pay(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), SettlementError> {
    if amount == 0 {
        return Ok(());
    }
    let client = token::Client::new(env, token);
    match client.try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(SettlementError::TransferFailed),
        Err(Ok(err)) if err.is_type(ScErrorType::Contract) => {
            Err(SettlementError::TransferFailed)
        }
        Err(_) => Err(SettlementError::TransferTimeout),
    }
}
