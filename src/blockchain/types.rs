//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Target test network for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Devnet => write!(f, "devnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Errors that can occur while executing a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Submission + confirmation did not complete in time. Treated as
    /// executor failure by the pipeline, but kept distinct for
    /// observability.
    #[error("transfer not confirmed after {0} seconds")]
    Timeout(u64),

    /// Invalid keypair material or signing failure.
    #[error("wallet error: {0}")]
    Wallet(String),
}

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Convert a SOL amount to lamports.
pub fn lamports_for_sol(amount: f64) -> u64 {
    (amount * LAMPORTS_PER_SOL as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_wire_format() {
        assert_eq!(serde_json::to_string(&Network::Devnet).unwrap(), "\"devnet\"");
        let network: Network = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(network, Network::Testnet);
        assert_eq!(Network::default(), Network::Devnet);
    }

    #[test]
    fn test_lamports_conversion() {
        assert_eq!(lamports_for_sol(1.0), 1_000_000_000);
        assert_eq!(lamports_for_sol(0.5), 500_000_000);
        assert_eq!(lamports_for_sol(5.0), 5 * LAMPORTS_PER_SOL);
    }

    #[test]
    fn test_error_display() {
        let err = TransferError::Timeout(30);
        assert_eq!(err.to_string(), "transfer not confirmed after 30 seconds");
    }
}
