//! Response shaping and error → status mapping.
//!
//! Every rejection becomes `{"error": "<user-facing message>"}` with the
//! status the error kind dictates. Internal detail never reaches the
//! client; the pipeline has already logged it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::admission::AdmissionError;

/// Newtype so the admission taxonomy stays HTTP-agnostic.
pub struct ApiError(pub AdmissionError);

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_hint())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AdmissionError::client("Invalid CAPTCHA"), StatusCode::BAD_REQUEST),
            (
                AdmissionError::RateLimited {
                    allowed: 2,
                    hours: 1.0,
                    dimension: "ip",
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AdmissionError::Infrastructure {
                    detail: "store down".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}
