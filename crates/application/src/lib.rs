//! Restmodel Application - Request lifecycle
//!
//! This crate runs REST interactions: it composes request bodies, performs
//! one transport call per verb through the [`Transport`] port, deduplicates
//! keyed requests, classifies responses and fans them out to client- and
//! request-scoped callbacks, and casts entities to and from JSON.

pub mod api;
pub mod batch;
pub mod connection;
pub mod error;
pub mod events;
pub mod model;
pub mod ports;
pub mod query_builder;
pub mod request;

#[cfg(test)]
mod test_support;

pub use api::Api;
pub use batch::Batch;
pub use connection::{Connection, ConnectionHandle};
pub use error::{ApplicationError, ApplicationResult, CallbackError};
pub use events::{
    EventKind, HasResponseEvents, ResponseDispatcher, ResponseEvents, SuccessEvent,
    ValidationEvent,
};
pub use model::{Caster, Entity, Model, PropertyValue};
pub use ports::{
    CancellationReceiver, CancellationToken, Transport, TransportError, TransportRequest,
    TransportResponse,
};
pub use query_builder::QueryBuilder;
pub use request::Request;
