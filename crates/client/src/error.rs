//! Client error model and the user-facing messages built from it.

use labstock_core::DomainError;
use serde_json::Value;
use thiserror::Error;

/// Failure of a gateway-backed operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, timeout...).
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The backend answered 2xx but the body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
    /// The request was rejected locally before reaching the gateway.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ClientError {
    /// Build an API error from a non-success status and its body.
    ///
    /// The message is the body's `message` field when present, otherwise the
    /// raw body text, otherwise the canonical reason of the status.
    pub fn from_status(status: u16, body: &Value) -> Self {
        let message = match body {
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string),
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => None,
        }
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unexpected status")
                .to_string()
        });

        ClientError::Api { status, message }
    }

    /// HTTP status, when the failure came from a backend response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status, message } => format!("Error: {status} - {message}"),
            ClientError::Network(message) => format!("Error: {message}"),
            ClientError::Parse(message) => format!("Error: unexpected response - {message}"),
            ClientError::Domain(err) => format!("Error: {err}"),
        }
    }
}
