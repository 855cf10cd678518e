//! Transaction record persistence.
//!
//! After a successful transfer the pipeline asks this collaborator to
//! persist who received what. Recording is best effort: the transfer
//! already happened, so a failure here is logged and swallowed
//! (at-least-once, not exactly-once).

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::identity::BACKEND_TOKEN_ENV_VAR;

/// A completed transfer, as persisted to the records backend.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
    pub signature: String,
    pub ip_address: String,
    pub wallet_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_id: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("records backend request failed: {0}")]
    Transport(String),
}

/// Persists transfer records.
#[async_trait]
pub trait TransactionRecorder: Send + Sync {
    async fn record(&self, record: &TransferRecord) -> Result<(), RecorderError>;
}

/// Backend-backed recorder posting to `{base_url}/transactions`.
pub struct HttpTransactionRecorder {
    client: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl HttpTransactionRecorder {
    pub fn new(base_url: String, token: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
            timeout,
        }
    }

    /// Build a recorder reading the bearer token from
    /// `FAUCET_BACKEND_TOKEN`.
    pub fn from_env(base_url: String, timeout: Duration) -> Result<Self, std::env::VarError> {
        let token = std::env::var(BACKEND_TOKEN_ENV_VAR)?;
        Ok(Self::new(base_url, token, timeout))
    }
}

#[async_trait]
impl TransactionRecorder for HttpTransactionRecorder {
    async fn record(&self, record: &TransferRecord) -> Result<(), RecorderError> {
        let url = format!("{}/transactions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(record)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RecorderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RecorderError::Transport(format!(
                "HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for HttpTransactionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransactionRecorder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization_omits_absent_identity() {
        let record = TransferRecord {
            signature: "sig".to_string(),
            ip_address: "203.0.113.7".to_string(),
            wallet_address: "wallet".to_string(),
            github_id: None,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("github_id").is_none());
        assert_eq!(json["ip_address"], "203.0.113.7");
    }
}
