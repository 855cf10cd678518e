//! External identity validation.
//!
//! A request may carry a linked external account id (e.g., a GitHub user
//! id attached by the session-terminating front end). The backend can be
//! asked whether that account qualifies for airdrops, typically rejecting
//! freshly created accounts.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the backend bearer token.
pub const BACKEND_TOKEN_ENV_VAR: &str = "FAUCET_BACKEND_TOKEN";

/// Errors talking to the identity backend. A definitive "does not
/// qualify" verdict is not an error; it comes back as `Ok(false)`.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("identity backend request failed: {0}")]
    Transport(String),

    #[error("identity backend returned a malformed response: {0}")]
    Malformed(String),
}

/// Answers whether a linked external account qualifies for airdrops.
#[async_trait]
pub trait IdentityValidator: Send + Sync {
    async fn validate(&self, identity_id: &str) -> Result<bool, ValidatorError>;
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    valid: bool,
}

/// Backend-backed validator hitting `{base_url}/gh-validation/{id}`.
pub struct HttpIdentityValidator {
    client: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl HttpIdentityValidator {
    pub fn new(base_url: String, token: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
            timeout,
        }
    }

    /// Build a validator reading the bearer token from
    /// `FAUCET_BACKEND_TOKEN`.
    pub fn from_env(base_url: String, timeout: Duration) -> Result<Self, std::env::VarError> {
        let token = std::env::var(BACKEND_TOKEN_ENV_VAR)?;
        Ok(Self::new(base_url, token, timeout))
    }
}

#[async_trait]
impl IdentityValidator for HttpIdentityValidator {
    async fn validate(&self, identity_id: &str) -> Result<bool, ValidatorError> {
        let url = format!("{}/gh-validation/{}", self.base_url, identity_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ValidatorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ValidatorError::Transport(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: ValidationResponse = response
            .json()
            .await
            .map_err(|e| ValidatorError::Malformed(e.to_string()))?;

        Ok(body.valid)
    }
}

impl std::fmt::Debug for HttpIdentityValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityValidator")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
