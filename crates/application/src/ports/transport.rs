//! Transport port
//!
//! The single capability the request lifecycle needs from an HTTP client:
//! send one request, get back a status and a parsed body.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use restmodel_domain::{HttpMethod, RequestPayload};

/// One outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Query parameters, JSON body or multipart fields
    pub payload: RequestPayload,
    /// Headers for this call
    pub headers: BTreeMap<String, String>,
}

/// What came back from the server, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed body; `null` when empty, a string when not JSON
    pub body: Value,
}

impl TransportResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Errors a transport reports instead of a response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Underlying error message
        message: String,
    },

    /// Server refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Connection failed for another reason.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Redirect limit exceeded.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit
        max: u32,
    },

    /// Payload could not be encoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The server answered with an error status the transport raised as a
    /// failure.
    #[error("Server responded with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Parsed error body
        body: Value,
    },

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Status carried by the failure, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Body carried by the failure.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Port for sending HTTP requests.
///
/// Implementations return `Ok` for every response that has a status,
/// including 4xx and 5xx. A transport may instead raise
/// [`TransportError::Status`]; it is classified the same way.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response could be obtained.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
