//! Domain error types

use thiserror::Error;

/// Configuration errors raised while describing requests or entities.
///
/// These are never retried: they indicate a misconfigured schema or client
/// and are returned to the caller at the moment the faulty call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request was created without a URL.
    #[error("request url is empty")]
    EmptyUrl,

    /// Neither an explicit URL nor a schema endpoint is available.
    #[error("no endpoint defined for {entity}")]
    MissingEndpoint {
        /// Name of the entity (or "request") lacking an endpoint.
        entity: String,
    },

    /// Two declarations in one schema resolve to the same property name.
    #[error("property `{name}` is declared more than once in {entity}")]
    DuplicateProperty {
        /// Name of the entity schema.
        entity: String,
        /// The colliding in-memory property name.
        name: String,
    },

    /// A property that the schema does not declare was addressed.
    #[error("property `{name}` is not declared in {entity}")]
    UnknownProperty {
        /// Name of the entity schema.
        entity: String,
        /// The requested property name.
        name: String,
    },

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Parameters could not be encoded for the wire.
    #[error("failed to encode parameters: {0}")]
    Encoding(String),

    /// Client settings are inconsistent.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
