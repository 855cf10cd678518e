//! Faucet wallet management.
//!
//! # Security
//! - The keypair is loaded ONLY from an environment variable
//! - Secret key material is never logged or serialized

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

use crate::blockchain::types::{TransferError, TransferResult};

/// Environment variable name for the faucet keypair (JSON byte array,
/// the standard Solana keyfile format).
pub const KEYPAIR_ENV_VAR: &str = "FAUCET_KEYPAIR";

/// The faucet's signing wallet.
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    /// Parse a keypair from keyfile JSON (an array of 64 bytes).
    pub fn from_json(keyfile_json: &str) -> TransferResult<Self> {
        let bytes: Vec<u8> = serde_json::from_str(keyfile_json)
            .map_err(|e| TransferError::Wallet(format!("invalid keypair JSON: {e}")))?;

        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|e| TransferError::Wallet(format!("invalid keypair bytes: {e}")))?;

        tracing::info!(address = %keypair.pubkey(), "Faucet wallet initialized");

        Ok(Self { keypair })
    }

    /// Load the wallet from the `FAUCET_KEYPAIR` environment variable.
    pub fn from_env() -> TransferResult<Self> {
        let keyfile = std::env::var(KEYPAIR_ENV_VAR).map_err(|_| {
            TransferError::Wallet(format!("environment variable {KEYPAIR_ENV_VAR} not set"))
        })?;

        Self::from_json(&keyfile)
    }

    /// The wallet's public address.
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// The underlying keypair, for transaction signing.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}
