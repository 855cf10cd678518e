//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the faucet.
//! All types derive Serde traits for deserialization from config files.
//! The loaded config is an immutable snapshot: it is validated once at
//! startup and shared via `Arc`, never re-read per request.

use serde::{Deserialize, Serialize};

/// Root configuration for the faucet service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaucetConfig {
    /// Development mode. Gates the CAPTCHA skip for loopback clients.
    /// Never controlled by request input.
    pub development_mode: bool,

    /// IPs exempt from rate limiting (raw, un-normalized form).
    pub allow_list: Vec<String>,

    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Timeout configuration for the request and each external call.
    pub timeouts: TimeoutConfig,

    /// Rate-limit policies per trust tier.
    pub limits: LimitsConfig,

    /// Bypass tokens with optional activation windows.
    pub bypass: Vec<BypassTokenConfig>,

    /// CAPTCHA verification settings.
    pub captcha: CaptchaConfig,

    /// External identity (linked account) settings.
    pub identity: IdentityConfig,

    /// Transaction record backend settings.
    pub records: RecordsConfig,

    /// Blockchain RPC settings.
    pub blockchain: BlockchainConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,

    /// CAPTCHA verification call timeout in seconds.
    pub captcha_secs: u64,

    /// External identity validation call timeout in seconds.
    pub identity_secs: u64,

    /// Transaction record persistence call timeout in seconds.
    pub records_secs: u64,

    /// Transfer submission + confirmation timeout in seconds.
    pub transfer_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            captcha_secs: 5,
            identity_secs: 5,
            records_secs: 5,
            transfer_secs: 30,
        }
    }
}

/// A sliding-window rate-limit policy.
///
/// Example: `covered_hours = 1`, `allowed_requests = 2`,
/// `max_amount_per_request = 5` permits 2 airdrops of up to 5 SOL each
/// per rolling hour, per identity dimension.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RatePolicy {
    /// Width of the sliding window, in hours. May be fractional.
    pub covered_hours: f64,

    /// Max accepted requests per key within the window.
    pub allowed_requests: u32,

    /// Ceiling on a single request's transfer amount, in SOL.
    pub max_amount_per_request: f64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            covered_hours: 1.0,
            allowed_requests: 2,
            max_amount_per_request: 5.0,
        }
    }
}

/// Rate-limit policies keyed by trust tier.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LimitsConfig {
    /// Policy for anonymous callers.
    pub default: RatePolicy,

    /// Policy for callers with a verified linked external identity.
    pub elevated: RatePolicy,
}

impl LimitsConfig {
    /// Widest configured policy window, in milliseconds. The rate-limit
    /// store's pruning horizon must cover at least this much.
    pub fn widest_window_ms(&self) -> i64 {
        let hours = self.default.covered_hours.max(self.elevated.covered_hours);
        (hours * 3_600_000.0).ceil() as i64
    }
}

/// A bypass token entry. Matching callers skip CAPTCHA and rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BypassTokenConfig {
    /// The bearer token value (exact match).
    pub token: String,

    /// Activation time, unix seconds. Absent means active immediately.
    #[serde(default)]
    pub starts_at: Option<i64>,

    /// Expiry time, unix seconds. Absent means never expires.
    #[serde(default)]
    pub ends_at: Option<i64>,
}

/// CAPTCHA verification settings.
///
/// The shared secret is read from the `FAUCET_CAPTCHA_SECRET` environment
/// variable, never from this file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Third-party verification endpoint.
    pub verify_url: String,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            verify_url: "https://challenges.cloudflare.com/turnstile/v0/siteverify"
                .to_string(),
        }
    }
}

/// External identity (linked account) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Require a linked external identity to request an airdrop.
    pub required: bool,

    /// Validate presented identities against the backend service.
    pub enabled: bool,

    /// Backend base URL (e.g., "https://backend.example.com/api").
    pub base_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            required: false,
            enabled: false,
            base_url: String::new(),
        }
    }
}

/// Transaction record backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Persist a record of each successful transfer.
    pub enabled: bool,

    /// Backend base URL.
    pub base_url: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
        }
    }
}

/// Blockchain RPC settings.
///
/// The faucet keypair is read from the `FAUCET_KEYPAIR` environment
/// variable, never from this file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// RPC endpoint for the primary test network.
    pub devnet_url: String,

    /// RPC endpoint for the secondary test network.
    pub testnet_url: String,

    /// Commitment level for transfer confirmation.
    pub commitment: String,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            devnet_url: "https://api.devnet.solana.com".to_string(),
            testnet_url: "https://api.testnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}
