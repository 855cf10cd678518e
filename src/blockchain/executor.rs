//! Transfer execution against the chain.
//!
//! # Responsibilities
//! - Build and sign a system-program transfer from the faucet wallet
//! - Submit and confirm on the requested test network
//! - Bound the whole interaction with a timeout
//!
//! A timeout is surfaced as `TransferError::Timeout`, not as "unknown":
//! callers treat it like any executor failure, operators can tell them
//! apart in the logs.

use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, Network, TransferError, TransferResult};
use crate::blockchain::wallet::Wallet;

/// Submits a validated transfer to the chain.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn execute_transfer(
        &self,
        to: &Pubkey,
        lamports: u64,
        network: Network,
    ) -> TransferResult<Signature>;
}

/// RPC-backed executor with one client per supported network.
pub struct RpcTransferExecutor {
    wallet: Wallet,
    devnet: RpcClient,
    testnet: RpcClient,
    timeout_duration: Duration,
}

fn parse_commitment(level: &str) -> CommitmentConfig {
    match level {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

impl RpcTransferExecutor {
    pub fn new(wallet: Wallet, config: &BlockchainConfig, timeout_duration: Duration) -> Self {
        let commitment = parse_commitment(&config.commitment);

        tracing::info!(
            devnet_url = %config.devnet_url,
            testnet_url = %config.testnet_url,
            commitment = %config.commitment,
            faucet = %wallet.pubkey(),
            "Transfer executor initialized"
        );

        Self {
            wallet,
            devnet: RpcClient::new_with_commitment(config.devnet_url.clone(), commitment),
            testnet: RpcClient::new_with_commitment(config.testnet_url.clone(), commitment),
            timeout_duration,
        }
    }

    fn client(&self, network: Network) -> &RpcClient {
        match network {
            Network::Devnet => &self.devnet,
            Network::Testnet => &self.testnet,
        }
    }

    /// Current faucet balance on `network`, in lamports. Used by health
    /// and monitoring surfaces.
    pub async fn faucet_balance(&self, network: Network) -> TransferResult<u64> {
        let pubkey = self.wallet.pubkey();
        let fut = self.client(network).get_balance(&pubkey);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(e)) => Err(TransferError::Rpc(e.to_string())),
            Err(_) => Err(TransferError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    async fn submit(
        &self,
        to: &Pubkey,
        lamports: u64,
        network: Network,
    ) -> TransferResult<Signature> {
        let client = self.client(network);

        let blockhash = client
            .get_latest_blockhash()
            .await
            .map_err(|e| TransferError::Rpc(e.to_string()))?;

        let instruction = system_instruction::transfer(&self.wallet.pubkey(), to, lamports);
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.wallet.pubkey()),
            &[self.wallet.keypair()],
            blockhash,
        );

        client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| TransferError::Rpc(e.to_string()))
    }
}

#[async_trait]
impl TransferExecutor for RpcTransferExecutor {
    async fn execute_transfer(
        &self,
        to: &Pubkey,
        lamports: u64,
        network: Network,
    ) -> TransferResult<Signature> {
        match timeout(self.timeout_duration, self.submit(to, lamports, network)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    network = %network,
                    lamports,
                    timeout_secs = self.timeout_duration.as_secs(),
                    "Transfer timed out"
                );
                Err(TransferError::Timeout(self.timeout_duration.as_secs()))
            }
        }
    }
}

impl std::fmt::Debug for RpcTransferExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransferExecutor")
            .field("faucet", &self.wallet.pubkey())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    fn test_executor(timeout: Duration) -> RpcTransferExecutor {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let wallet = Wallet::from_json(&json).unwrap();

        let config = BlockchainConfig {
            // Unroutable address: connections hang until the timeout.
            devnet_url: "http://10.255.255.1:8899".to_string(),
            testnet_url: "http://10.255.255.1:8899".to_string(),
            commitment: "confirmed".to_string(),
        };
        RpcTransferExecutor::new(wallet, &config, timeout)
    }

    #[test]
    fn test_commitment_parsing() {
        assert_eq!(parse_commitment("processed"), CommitmentConfig::processed());
        assert_eq!(parse_commitment("finalized"), CommitmentConfig::finalized());
        assert_eq!(parse_commitment("confirmed"), CommitmentConfig::confirmed());
        assert_eq!(parse_commitment("bogus"), CommitmentConfig::confirmed());
    }

    #[tokio::test]
    async fn test_unreachable_rpc_fails() {
        // Depending on the network stack the connection either hangs
        // until the deadline (Timeout) or is refused outright (Rpc).
        let executor = test_executor(Duration::from_millis(250));
        let to = Keypair::new().pubkey();

        let err = executor
            .execute_transfer(&to, 1_000, Network::Devnet)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Timeout(_) | TransferError::Rpc(_)));
    }

    #[tokio::test]
    async fn test_balance_against_unreachable_rpc_fails() {
        let executor = test_executor(Duration::from_millis(250));

        let err = executor.faucet_balance(Network::Devnet).await.unwrap_err();
        assert!(matches!(err, TransferError::Timeout(_) | TransferError::Rpc(_)));
    }
}
