//! Request and decision types for the admission pipeline.

use solana_sdk::pubkey::Pubkey;

use crate::blockchain::Network;
use crate::config::RatePolicy;

/// One airdrop request, as seen by the pipeline. Transient; the only
/// persistent side effects it causes are rate-limit records.
#[derive(Debug, Clone, Default)]
pub struct AirdropRequest {
    /// Requested recipient, raw base58 form.
    pub wallet_address: String,

    /// Requested amount in SOL.
    pub amount: f64,

    /// Target test network.
    pub network: Network,

    /// Client IP derived from proxy headers. `None` when unresolvable.
    pub client_ip: Option<String>,

    /// Client-supplied CAPTCHA token.
    pub captcha_token: Option<String>,

    /// Bearer token from the Authorization header, candidate for bypass.
    pub bearer_token: Option<String>,

    /// Session-verified external account id, if the caller linked one.
    pub external_identity: Option<String>,
}

/// Caller classification determining which rate-limit policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustTier {
    /// Anonymous caller.
    Default,
    /// Caller with a verified linked external identity.
    Elevated,
}

/// A positive admission decision: the validated transfer the executor
/// should perform, plus the policy that admitted it.
#[derive(Debug, Clone)]
pub struct Admission {
    pub wallet: Pubkey,
    pub lamports: u64,
    pub network: Network,
    pub policy: RatePolicy,
    pub tier: TrustTier,
}
