//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (faucet keypair)
//!     → wallet.rs (key loading, signing)
//!     → executor.rs (system transfer, submit + confirm, timeout)
//! ```
//!
//! # Security Constraints
//! - The faucet keypair comes ONLY from the environment
//! - Never log secret key material
//! - Every RPC interaction has a configurable timeout
//! - Executor failure surfaces a fixed user-facing message; detail is
//!   logged server-side only

pub mod executor;
pub mod types;
pub mod wallet;

pub use executor::{RpcTransferExecutor, TransferExecutor};
pub use types::{lamports_for_sol, BlockchainConfig, Network, TransferError};
pub use wallet::Wallet;
