//! CAPTCHA verification.
//!
//! # Data Flow
//! ```text
//! client-supplied token
//!     → TurnstileVerifier (POST form to siteverify, shared secret)
//!     → bool (network failure, timeout, or non-success ⇒ false)
//! ```
//!
//! # Design Decisions
//! - Fail closed: any error verifying means the CAPTCHA did not pass
//! - The shared secret comes only from the environment, never logged
//! - The development-mode loopback skip lives in the pipeline, gated on
//!   config, not here

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Environment variable holding the verification shared secret.
pub const CAPTCHA_SECRET_ENV_VAR: &str = "FAUCET_CAPTCHA_SECRET";

/// Validates a client-supplied CAPTCHA token with a third-party service.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Returns true iff the token passes verification.
    async fn verify(&self, token: &str) -> bool;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
}

/// Cloudflare Turnstile verifier.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    verify_url: String,
    secret: String,
    timeout: Duration,
}

impl TurnstileVerifier {
    pub fn new(verify_url: String, secret: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url,
            secret,
            timeout,
        }
    }

    /// Build a verifier reading the secret from `FAUCET_CAPTCHA_SECRET`.
    pub fn from_env(verify_url: String, timeout: Duration) -> Result<Self, std::env::VarError> {
        let secret = std::env::var(CAPTCHA_SECRET_ENV_VAR)?;
        Ok(Self::new(verify_url, secret, timeout))
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str) -> bool {
        let params = [("secret", self.secret.as_str()), ("response", token)];

        let response = self
            .client
            .post(&self.verify_url)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(response) => match response.json::<SiteVerifyResponse>().await {
                Ok(body) => body.success,
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed CAPTCHA verification response");
                    false
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "CAPTCHA verification request failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for TurnstileVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnstileVerifier")
            .field("verify_url", &self.verify_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
