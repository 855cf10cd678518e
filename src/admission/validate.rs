//! Field validation for airdrop requests.
//!
//! Checks run in a fixed order with a specific message per failure:
//! wallet presence, amount presence, amount ceiling, wallet syntax,
//! on-curve. All of it is local computation; validation always precedes
//! any external call in the pipeline.

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::admission::error::AdmissionError;
use crate::config::RatePolicy;

/// Validate the wallet address and amount against the selected policy.
/// Returns the parsed recipient key.
pub fn validate_transfer(
    wallet_address: &str,
    amount: f64,
    policy: &RatePolicy,
) -> Result<Pubkey, AdmissionError> {
    if wallet_address.is_empty() {
        return Err(AdmissionError::client("Missing wallet address."));
    }

    if amount <= 0.0 {
        return Err(AdmissionError::client("Missing SOL amount."));
    }

    if amount > policy.max_amount_per_request {
        return Err(AdmissionError::client("Requested SOL amount too large."));
    }

    let pubkey = Pubkey::from_str(wallet_address)
        .map_err(|_| AdmissionError::client("Please enter valid wallet address."))?;

    // Program-derived addresses have no private key; transfers to them
    // are unrecoverable here.
    if !pubkey.is_on_curve() {
        return Err(AdmissionError::client("Address can't be a PDA."));
    }

    Ok(pubkey)
}
