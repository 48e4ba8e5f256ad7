//! Subscribe endpoint message definitions
//!
//! All bodies are JSON. Success is signalled by the HTTP status alone;
//! the response body is informational.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shown when a rejection carries no usable `error` field
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Shown when no response was obtained at all
pub const CONNECTIVITY_MESSAGE: &str = "Failed to connect. Try again.";

pub(super) const DEFAULT_SUCCESS_MESSAGE: &str = "Successfully subscribed";

/// Request body for `POST /api/subscribe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// 200 response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscribeResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    /// Contact id from the audience provider; absent in test mode
    #[serde(default)]
    pub id: Option<String>,
}

/// 400/500 response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,

    /// Upstream provider detail, only on 500
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Message to surface for a rejected request
    pub fn user_message(body: &str) -> String {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
        if let Some(details) = &parsed.details {
            debug!(%details, "upstream error details");
        }

        parsed
            .error
            .filter(|error| !error.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = SubscribeRequest { email: "weaver@example.com".into() };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"email":"weaver@example.com"}"#);
    }

    #[test]
    fn test_response_without_id() {
        let resp: SubscribeResponse =
            serde_json::from_str(r#"{"success":true,"message":"Subscribed (test mode)"}"#).unwrap();
        assert!(resp.success);
        assert!(resp.id.is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            ErrorBody::user_message(r#"{"error":"Email is required"}"#),
            "Email is required"
        );
        assert_eq!(
            ErrorBody::user_message(r#"{"error":"Failed to subscribe","details":"rate limited"}"#),
            "Failed to subscribe"
        );
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(ErrorBody::user_message(""), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ErrorBody::user_message("<html>502</html>"), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ErrorBody::user_message(r#"{"details":"x"}"#), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ErrorBody::user_message(r#"{"error":""}"#), GENERIC_FAILURE_MESSAGE);
    }
}
