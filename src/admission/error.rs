//! Admission error taxonomy.
//!
//! Rejections carry a kind, so the HTTP layer maps kind → status
//! deterministically instead of sniffing message strings. `Display` is
//! always the user-facing text; internal detail rides in separate fields
//! and is only ever logged.

use thiserror::Error;

/// Fixed user-facing message for any transfer executor failure.
pub const FAUCET_EMPTY_MESSAGE: &str = "Faucet is empty, please try again later";

/// Fixed user-facing message for external identity service failures.
pub const IDENTITY_UNAVAILABLE_MESSAGE: &str =
    "Airdrop service is temporarily unavailable, please try again later";

/// Why a request was not admitted (or failed after admission).
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Malformed or missing input, invalid CAPTCHA, invalid wallet.
    /// The message is user-actionable and specific.
    #[error("{0}")]
    Client(String),

    /// A rate-limit dimension is at or over its policy limit.
    #[error("You have exceeded the {allowed} airdrops limit in the past {hours} hour(s)")]
    RateLimited {
        allowed: u32,
        hours: f64,
        /// Which identity dimension tripped, for logs and metrics.
        dimension: &'static str,
    },

    /// An external collaborator failed. The user sees a fixed generic
    /// message; `detail` is for server-side logs only.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        detail: String,
    },

    /// Our own infrastructure failed (e.g., rate-limit store unreachable).
    #[error("Internal server error")]
    Infrastructure { detail: String },
}

impl AdmissionError {
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client(message.into())
    }

    /// HTTP status the error maps to.
    pub fn http_status_hint(&self) -> u16 {
        match self {
            Self::Client(_) | Self::Upstream { .. } => 400,
            Self::RateLimited { .. } => 429,
            Self::Infrastructure { .. } => 500,
        }
    }

    /// Stable label for the admissions-by-outcome metric.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Client(_) => "client_error",
            Self::RateLimited { .. } => "rate_limited",
            Self::Upstream { .. } => "upstream_error",
            Self::Infrastructure { .. } => "infrastructure_error",
        }
    }

    /// Internal detail for operators, if any. Never sent to clients.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Upstream { detail, .. } | Self::Infrastructure { detail } => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_states_policy() {
        let err = AdmissionError::RateLimited {
            allowed: 2,
            hours: 1.0,
            dimension: "ip",
        };
        let message = err.to_string();
        assert!(message.contains("2 airdrops limit"));
        assert!(message.contains("1 hour(s)"));
        assert_eq!(err.http_status_hint(), 429);
    }

    #[test]
    fn test_upstream_detail_not_in_message() {
        let err = AdmissionError::Upstream {
            message: FAUCET_EMPTY_MESSAGE,
            detail: "RPC error: connection refused".to_string(),
        };
        assert_eq!(err.to_string(), FAUCET_EMPTY_MESSAGE);
        assert_eq!(err.detail(), Some("RPC error: connection refused"));
        assert_eq!(err.http_status_hint(), 400);
    }

    #[test]
    fn test_infrastructure_is_generic() {
        let err = AdmissionError::Infrastructure {
            detail: "store down".to_string(),
        };
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.http_status_hint(), 500);
    }
}
