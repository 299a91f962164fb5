//! Error types for the Kubera client.
//!
//! Every HTTP failure the API reports is mapped onto exactly one status-derived
//! variant. Transport failures stay separate in [`KuberaError::Network`].

use serde_json::Value;
use thiserror::Error;

/// Result type for Kubera operations.
pub type Result<T> = std::result::Result<T, KuberaError>;

/// Errors that can occur when using the Kubera client.
#[derive(Error, Debug)]
pub enum KuberaError {
    /// The API rejected the credentials (HTTP 401).
    #[error("{message}")]
    Authentication {
        /// Human-readable error message, including the server's text.
        message: String,
        /// HTTP status code.
        status_code: u16,
        /// Parsed error body, if the server sent JSON.
        raw_body: Option<Value>,
    },

    /// The API key lacks the permission for this operation (HTTP 403).
    #[error("{message}")]
    Permission {
        /// Human-readable error message, including the server's text.
        message: String,
        /// HTTP status code.
        status_code: u16,
        /// Parsed error body, if the server sent JSON.
        raw_body: Option<Value>,
    },

    /// Rate limit exceeded (HTTP 429).
    #[error("{message}")]
    RateLimit {
        /// Human-readable error message, including the server's text.
        message: String,
        /// HTTP status code.
        status_code: u16,
        /// Parsed error body, if the server sent JSON.
        raw_body: Option<Value>,
    },

    /// The request payload was rejected (HTTP 400).
    #[error("{message}")]
    Validation {
        /// Human-readable error message, including the server's text.
        message: String,
        /// HTTP status code.
        status_code: u16,
        /// Parsed error body, if the server sent JSON.
        raw_body: Option<Value>,
    },

    /// Any other non-success response.
    #[error("{message}")]
    Api {
        /// Human-readable error message, including the server's text.
        message: String,
        /// HTTP status code.
        status_code: u16,
        /// Parsed error body, if the server sent JSON.
        raw_body: Option<Value>,
    },

    /// Connection refused, timeout, DNS failure and other transport errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No usable API key and secret were found.
    #[error(
        "API credentials not found. Please provide api_key and secret, \
         or set KUBERA_API_KEY and KUBERA_SECRET environment variables."
    )]
    MissingCredentials,

    /// The request was rejected locally before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing the local portfolio cache failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl KuberaError {
    /// Returns the HTTP status code if the error came from an API response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            KuberaError::Authentication { status_code, .. }
            | KuberaError::Permission { status_code, .. }
            | KuberaError::RateLimit { status_code, .. }
            | KuberaError::Validation { status_code, .. }
            | KuberaError::Api { status_code, .. } => Some(*status_code),
            KuberaError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the parsed server error body, when one was available.
    pub fn raw_body(&self) -> Option<&Value> {
        match self {
            KuberaError::Authentication { raw_body, .. }
            | KuberaError::Permission { raw_body, .. }
            | KuberaError::RateLimit { raw_body, .. }
            | KuberaError::Validation { raw_body, .. }
            | KuberaError::Api { raw_body, .. } => raw_body.as_ref(),
            _ => None,
        }
    }

    /// Human-readable message, without any variant prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            KuberaError::Authentication { message, .. }
            | KuberaError::Permission { message, .. }
            | KuberaError::RateLimit { message, .. }
            | KuberaError::Validation { message, .. }
            | KuberaError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns true if repeating the same request later may succeed.
    ///
    /// The client never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            KuberaError::RateLimit { .. } => true,
            KuberaError::Network(e) => e.is_timeout() || e.is_connect(),
            KuberaError::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Returns true if this is an authentication or permission error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            KuberaError::Authentication { .. }
                | KuberaError::Permission { .. }
                | KuberaError::MissingCredentials
        )
    }
}
