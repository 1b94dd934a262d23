//! RPC error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the wallet service (`{"code": ..., "message": ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceError {
    /// Decode an error body. Bodies without a code or message are not
    /// service errors.
    pub fn from_body(body: &str) -> Option<Self> {
        let err: ServiceError = serde_json::from_str(body).ok()?;
        if err.code.is_empty() && err.message.is_empty() {
            None
        } else {
            Some(err)
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error on {method} {url}: {source}")]
    Http {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} on {method} {url}: {body}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("service error (HTTP {status}) {error}")]
    Service { status: u16, error: ServiceError },

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response from {path}: {message}")]
    Protocol { path: String, message: String },

    #[error("connection failed: {0}")]
    Connection(String),
}

impl RpcError {
    /// The service error code, if this is a service error.
    pub fn service_code(&self) -> Option<&str> {
        match self {
            RpcError::Service { error, .. } => Some(error.code.as_str()),
            _ => None,
        }
    }

    pub fn is_service_code(&self, code: &str) -> bool {
        self.service_code() == Some(code)
    }
}
