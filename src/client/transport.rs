//! Seam between the client policy layer and the wire.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Raw provider answer: status code plus decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any status code was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Network(String),
    Decode(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Network(e) => write!(f, "network error: {}", e),
            TransportError::Decode(e) => write!(f, "invalid response body: {}", e),
        }
    }
}

/// Performs a GET against the provider.
///
/// `path` is relative to the provider root ("" for the credential probe,
/// "/soccer_epl/odds" for odds). `query` already includes the credential.
#[async_trait]
pub trait OddsTransport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError>;
}
