//! The admission pipeline: the single canonical decision path for every
//! airdrop request.
//!
//! # Evaluation order (short-circuits on first rejection)
//! 1. Transport precondition — client IP must be resolvable
//! 2. Identity precondition — linked identity, when required/present
//! 3. Policy selection by trust tier
//! 4. Field validation (wallet, amount)
//! 5. Bypass check — authorized bearer tokens skip 6–7
//! 6. CAPTCHA (skipped only for loopback clients in development mode)
//! 7. Allow-list, then per-dimension sliding-window rate limit
//! 8. Transfer execution, then best-effort transaction recording
//!
//! Rate-limit attempts are recorded before the transfer call, so a failed
//! transfer still consumes a slot.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::future::join_all;
use solana_sdk::signature::Signature;

use crate::admission::bypass::BypassAuthority;
use crate::admission::error::{
    AdmissionError, FAUCET_EMPTY_MESSAGE, IDENTITY_UNAVAILABLE_MESSAGE,
};
use crate::admission::identity::{normalize_ip, policy_for_tier};
use crate::admission::types::{Admission, AirdropRequest, TrustTier};
use crate::admission::validate::validate_transfer;
use crate::blockchain::{lamports_for_sol, TransferExecutor};
use crate::captcha::CaptchaVerifier;
use crate::config::schema::{FaucetConfig, LimitsConfig};
use crate::identity::IdentityValidator;
use crate::observability::metrics;
use crate::ratelimit::{RateLimitDecision, RateLimitStore};
use crate::records::{TransactionRecorder, TransferRecord};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// The core orchestrator. Holds an immutable snapshot of the relevant
/// config plus its collaborators; per-request state lives on the stack.
pub struct AdmissionPipeline {
    limits: LimitsConfig,
    allow_list: HashSet<String>,
    bypass: BypassAuthority,
    development_mode: bool,
    identity_required: bool,
    captcha: Arc<dyn CaptchaVerifier>,
    identity_validator: Option<Arc<dyn IdentityValidator>>,
    store: Arc<dyn RateLimitStore>,
    executor: Arc<dyn TransferExecutor>,
    recorder: Option<Arc<dyn TransactionRecorder>>,
}

impl AdmissionPipeline {
    pub fn new(
        config: &FaucetConfig,
        captcha: Arc<dyn CaptchaVerifier>,
        store: Arc<dyn RateLimitStore>,
        executor: Arc<dyn TransferExecutor>,
    ) -> Self {
        Self {
            limits: config.limits.clone(),
            allow_list: config.allow_list.iter().cloned().collect(),
            bypass: BypassAuthority::from_config(&config.bypass),
            development_mode: config.development_mode,
            identity_required: config.identity.required,
            captcha,
            identity_validator: None,
            store,
            executor,
            recorder: None,
        }
    }

    /// Attach an external identity validator (step 2).
    pub fn with_identity_validator(mut self, validator: Arc<dyn IdentityValidator>) -> Self {
        self.identity_validator = Some(validator);
        self
    }

    /// Attach a transaction recorder (step 8, best effort).
    pub fn with_recorder(mut self, recorder: Arc<dyn TransactionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Steps 1–7. On success returns the validated transfer and the
    /// policy that admitted it; rate-limit slots for every dimension have
    /// already been consumed.
    pub async fn admit(&self, request: &AirdropRequest) -> Result<Admission, AdmissionError> {
        let (now_ms, now_secs) = unix_now();

        // 1. Transport precondition.
        let ip = request
            .client_ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
            .ok_or_else(|| AdmissionError::client("Could not determine client IP"))?;

        // 2. Identity precondition.
        let identity = request.external_identity.as_deref().filter(|id| !id.is_empty());
        if self.identity_required && identity.is_none() {
            return Err(AdmissionError::client(
                "Please sign in to request an airdrop",
            ));
        }
        if let (Some(id), Some(validator)) = (identity, &self.identity_validator) {
            match validator.validate(id).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(identity = %id, ip = %ip, "Rejected: identity does not qualify");
                    return Err(AdmissionError::client(
                        "Connected account does not qualify for airdrops",
                    ));
                }
                Err(e) => {
                    tracing::error!(identity = %id, error = %e, "Identity validation failed");
                    return Err(AdmissionError::Upstream {
                        message: IDENTITY_UNAVAILABLE_MESSAGE,
                        detail: e.to_string(),
                    });
                }
            }
        }

        // 3. Policy selection.
        let tier = TrustTier::for_identity(identity);
        let policy = policy_for_tier(&self.limits, tier);

        // 4. Field validation.
        let wallet = validate_transfer(&request.wallet_address, request.amount, &policy)
            .map_err(|e| {
                tracing::debug!(
                    wallet = %request.wallet_address,
                    ip = %ip,
                    amount = request.amount,
                    "Rejected: {e}"
                );
                e
            })?;

        let admission = Admission {
            wallet,
            lamports: lamports_for_sol(request.amount),
            network: request.network,
            policy,
            tier,
        };

        // 5. Bypass check.
        if let Some(token) = request.bearer_token.as_deref() {
            if self.bypass.is_authorized(token, now_secs) {
                tracing::info!(ip = %ip, wallet = %wallet, "Bypass token accepted");
                return Ok(admission);
            }
        }

        // 6. CAPTCHA. The loopback skip is a development convenience
        // gated on config, never on request input.
        if self.development_mode && is_loopback(ip) {
            tracing::debug!(ip = %ip, "Skipping CAPTCHA for loopback client in development mode");
        } else {
            let token = request.captcha_token.as_deref().unwrap_or("");
            if !self.captcha.verify(token).await {
                tracing::debug!(
                    wallet = %request.wallet_address,
                    ip = %ip,
                    amount = request.amount,
                    "Rejected: failed CAPTCHA"
                );
                return Err(AdmissionError::client("Invalid CAPTCHA"));
            }
        }

        // 7. Allow-list, then rate limit across every dimension in play.
        if self.allow_list.contains(ip) {
            tracing::info!(ip = %ip, "Allow-listed IP, skipping rate limit");
            return Ok(admission);
        }

        let mut dimensions: Vec<(&'static str, String)> = vec![
            ("ip", normalize_ip(ip)),
            ("wallet", request.wallet_address.clone()),
        ];
        if let Some(id) = identity {
            dimensions.push(("account", id.to_string()));
        }

        let threshold_ms = now_ms - (policy.covered_hours * MS_PER_HOUR) as i64;
        let checks = dimensions.iter().map(|(_, key)| {
            self.store
                .check_and_record(key, now_ms, threshold_ms, policy.allowed_requests)
        });

        for ((dimension, _), result) in dimensions.iter().zip(join_all(checks).await) {
            match result {
                Ok(RateLimitDecision::Admitted) => {}
                Ok(RateLimitDecision::OverLimit) => {
                    tracing::debug!(
                        wallet = %request.wallet_address,
                        ip = %ip,
                        dimension = %dimension,
                        "Rejected: rate limit exceeded"
                    );
                    metrics::record_rate_limited(dimension);
                    return Err(AdmissionError::RateLimited {
                        allowed: policy.allowed_requests,
                        hours: policy.covered_hours,
                        dimension,
                    });
                }
                Err(e) => {
                    tracing::error!(dimension = %dimension, error = %e, "Rate limit store failure");
                    return Err(AdmissionError::Infrastructure {
                        detail: e.to_string(),
                    });
                }
            }
        }

        Ok(admission)
    }

    /// The full request lifecycle: admission, transfer execution, and
    /// best-effort transaction recording.
    pub async fn process(&self, request: &AirdropRequest) -> Result<Signature, AdmissionError> {
        let admission = match self.admit(request).await {
            Ok(admission) => admission,
            Err(e) => {
                metrics::record_admission(e.metric_label());
                return Err(e);
            }
        };

        let signature = match self
            .executor
            .execute_transfer(&admission.wallet, admission.lamports, admission.network)
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                tracing::error!(
                    wallet = %admission.wallet,
                    lamports = admission.lamports,
                    network = %admission.network,
                    error = %e,
                    "Transfer failed"
                );
                metrics::record_transfer(false);
                let err = AdmissionError::Upstream {
                    message: FAUCET_EMPTY_MESSAGE,
                    detail: e.to_string(),
                };
                metrics::record_admission(err.metric_label());
                return Err(err);
            }
        };

        metrics::record_transfer(true);
        metrics::record_admission("accepted");
        tracing::info!(
            wallet = %admission.wallet,
            amount = request.amount,
            network = %admission.network,
            signature = %signature,
            "Airdrop successful"
        );

        if let Some(recorder) = &self.recorder {
            let record = TransferRecord {
                signature: signature.to_string(),
                ip_address: request.client_ip.clone().unwrap_or_default(),
                wallet_address: request.wallet_address.clone(),
                github_id: request.external_identity.clone(),
                timestamp: unix_now().0,
            };
            // The transfer already succeeded; a recording failure must
            // not fail the request.
            if let Err(e) = recorder.record(&record).await {
                tracing::warn!(signature = %signature, error = %e, "Failed to persist transaction record");
            }
        }

        Ok(signature)
    }
}

fn unix_now() -> (i64, i64) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_millis() as i64, now.as_secs() as i64)
}

fn is_loopback(ip: &str) -> bool {
    ip.parse::<IpAddr>().map(|addr| addr.is_loopback()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback("127.0.0.1"));
        assert!(is_loopback("::1"));
        assert!(!is_loopback("203.0.113.7"));
        assert!(!is_loopback("localhost"));
        assert!(!is_loopback(""));
    }
}
