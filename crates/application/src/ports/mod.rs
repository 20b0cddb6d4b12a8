//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the request lifecycle and the
//! outside world. Adapters in the infrastructure layer implement them.

mod cancellation;
mod transport;

pub use cancellation::{CancellationReceiver, CancellationToken};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
