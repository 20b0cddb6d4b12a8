//! Restmodel Domain - Core types
//!
//! This crate defines what a REST interaction looks like: the body builders
//! (filters, modifiers, pagination, actions), payload encoding, the response
//! record and its classification, and the schema declarations entities are
//! cast with.
//! All types here are pure Rust with no I/O dependencies.

pub mod case;
pub mod error;
pub mod json;
pub mod request;
pub mod response;
pub mod schema;
pub mod settings;

pub use error::{DomainError, DomainResult};
pub use request::{
    Direction, FileUpload, FormField, FormValue, HttpMethod, QueryComponent, QueryParameters,
    RequestPayload, UploadFiles,
};
pub use response::{
    Response, ResponseOutcome, StatusCode, ValidationError, ValidationPayload,
};
pub use schema::{Cast, CastFn, PropertyDeclaration, PropertyKind, Schema, SchemaBuilder};
pub use settings::ClientSettings;
