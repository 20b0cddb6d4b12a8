//! Application error types

use thiserror::Error;
use restmodel_domain::DomainError;

/// Error returned by a registered response callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callback failed: {message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates a callback error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Application-level errors.
///
/// Transport failures and HTTP error statuses are not in here: they are
/// recorded on the response and routed to callbacks instead.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A configuration error in a request or schema.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A verb was executed on a request that has no client.
    #[error("request has no client; create it through an Api or call set_api")]
    MissingClient,

    /// A response callback failed during dispatch.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
