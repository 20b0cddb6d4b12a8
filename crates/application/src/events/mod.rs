//! Response events: per-owner callback registries, the dispatcher that
//! fans a classified response out to them, and the callback surface shared
//! by requests and entities.

mod dispatcher;
mod registry;

pub use dispatcher::ResponseDispatcher;
pub use registry::{
    Callback, CallbackFuture, EventKind, ResponseEvents, SuccessEvent, ValidationEvent,
};

use std::future::Future;
use std::sync::Arc;

use restmodel_domain::Response;

use crate::error::CallbackError;

/// Request-scoped callback registration.
///
/// Callbacks registered through this trait fire for the next completed
/// attempt only; they are cleared once it has been dispatched.
pub trait HasResponseEvents {
    /// The owner's registry.
    fn response_events_mut(&mut self) -> &mut ResponseEvents;

    /// Called with the success payload on 2xx.
    fn on_success<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(SuccessEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_success(callback);
        self
    }

    /// Called for statuses without a dedicated channel and failed attempts.
    fn on_error<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_error(callback);
        self
    }

    /// Called with the expanded validation errors on 422.
    fn on_validation_error<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(ValidationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_validation_error(callback);
        self
    }

    /// Called on 401.
    fn on_unauthorized<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_unauthorized(callback);
        self
    }

    /// Called on 403.
    fn on_forbidden<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_forbidden(callback);
        self
    }

    /// Called after any attempt that reached an outcome.
    fn on_finished<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_finished(callback);
        self
    }

    /// Called when the attempt was cancelled.
    fn on_cancelled<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.response_events_mut().add_on_cancelled(callback);
        self
    }

    /// Clears `on_success` callbacks.
    fn clear_on_success_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::Success);
        self
    }

    /// Clears `on_error` callbacks.
    fn clear_on_error_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::Error);
        self
    }

    /// Clears `on_validation_error` callbacks.
    fn clear_on_validation_error_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::ValidationError);
        self
    }

    /// Clears `on_unauthorized` callbacks.
    fn clear_on_unauthorized_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::Unauthorized);
        self
    }

    /// Clears `on_forbidden` callbacks.
    fn clear_on_forbidden_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::Forbidden);
        self
    }

    /// Clears `on_finished` callbacks.
    fn clear_on_finished_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::Finished);
        self
    }

    /// Clears `on_cancelled` callbacks.
    fn clear_on_cancelled_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear(EventKind::Cancelled);
        self
    }

    /// Clears every callback.
    fn clear_all_callbacks(&mut self) -> &mut Self {
        self.response_events_mut().clear_all();
        self
    }
}
