//! Transports carrying a subscribe request to the backend

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{Config, SubscribeMode};

use super::protocol::{
    ErrorBody, SubscribeRequest, SubscribeResponse, CONNECTIVITY_MESSAGE, DEFAULT_SUCCESS_MESSAGE,
};

/// A request the backend accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub id: Option<String>,
    pub message: String,
}

/// Why a subscribe attempt failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The backend answered with a non-2xx status
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// No response was obtained
    #[error("connection failed: {0}")]
    Connectivity(String),
}

impl RequestError {
    /// Inline text for the form
    pub fn user_message(&self) -> &str {
        match self {
            RequestError::Rejected { message, .. } => message,
            RequestError::Connectivity(_) => CONNECTIVITY_MESSAGE,
        }
    }
}

/// Carries one subscribe request and reports its outcome
#[async_trait]
pub trait SubscribeTransport: Send + Sync {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<Accepted, RequestError>;
}

/// Live transport: JSON POST to the configured endpoint
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SubscribeTransport for HttpTransport {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<Accepted, RequestError> {
        debug!(endpoint = %self.endpoint, "posting subscribe request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(?e, "subscribe request failed to send");
                RequestError::Connectivity(e.to_string())
            })?;

        let status = response.status().as_u16();
        // An unreadable body still leaves the status to go on.
        let body = response.text().await.unwrap_or_else(|e| {
            warn!(?e, status, "failed to read subscribe response body");
            String::new()
        });

        interpret_response(status, &body)
    }
}

/// Map a status and raw body onto the outcome of the attempt
fn interpret_response(status: u16, body: &str) -> Result<Accepted, RequestError> {
    if (200..300).contains(&status) {
        let parsed: SubscribeResponse = serde_json::from_str(body).unwrap_or_default();
        if !parsed.success {
            debug!(status, "accepted without a success flag in the body");
        }
        return Ok(Accepted {
            id: parsed.id,
            message: parsed
                .message
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
        });
    }

    let message = ErrorBody::user_message(body);
    warn!(status, %message, "subscribe request rejected");
    Err(RequestError::Rejected { status, message })
}

/// Stub deployment: accepts every address without a network call
#[derive(Debug, Default)]
pub struct TestModeTransport;

#[async_trait]
impl SubscribeTransport for TestModeTransport {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<Accepted, RequestError> {
        info!(email = %request.email, "subscribe (test mode)");
        Ok(Accepted {
            id: None,
            message: "Subscribed (test mode)".to_string(),
        })
    }
}

/// Pick the transport for the configured mode
pub fn build_transport(config: &Config) -> Arc<dyn SubscribeTransport> {
    match config.mode {
        SubscribeMode::Live => Arc::new(HttpTransport::new(config.endpoint.clone())),
        SubscribeMode::Test => Arc::new(TestModeTransport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::protocol::GENERIC_FAILURE_MESSAGE;

    #[test]
    fn test_success_with_id() {
        let accepted = interpret_response(
            200,
            r#"{"success":true,"message":"Successfully subscribed","id":"abc"}"#,
        )
        .unwrap();
        assert_eq!(accepted.id.as_deref(), Some("abc"));
        assert_eq!(accepted.message, "Successfully subscribed");
    }

    #[test]
    fn test_success_with_unparseable_body() {
        let accepted = interpret_response(201, "OK").unwrap();
        assert_eq!(accepted.id, None);
        assert_eq!(accepted.message, DEFAULT_SUCCESS_MESSAGE);
    }

    #[test]
    fn test_client_error_message_verbatim() {
        let err = interpret_response(400, r#"{"error":"Email is required"}"#).unwrap_err();
        assert_eq!(
            err,
            RequestError::Rejected {
                status: 400,
                message: "Email is required".into()
            }
        );
        assert_eq!(err.user_message(), "Email is required");
    }

    #[test]
    fn test_server_error_without_body() {
        let err = interpret_response(500, "").unwrap_err();
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_connectivity_message() {
        let err = RequestError::Connectivity("dns error".into());
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
        assert!(err.to_string().contains("dns error"));
    }

    #[test]
    fn test_mode_accepts_everything() {
        let transport = TestModeTransport;
        let accepted = tokio_test::assert_ok!(tokio_test::block_on(
            transport.subscribe(&SubscribeRequest { email: "a@b.co".into() })
        ));
        assert_eq!(accepted.id, None);
        assert_eq!(accepted.message, "Subscribed (test mode)");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connectivity_error() {
        // Nothing listens on the discard port locally.
        let transport = HttpTransport::new("http://127.0.0.1:9/api/subscribe");
        let err = transport
            .subscribe(&SubscribeRequest { email: "a@b.co".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Connectivity(_)));
    }
}
