//! Callback lists keyed by outcome kind.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use restmodel_domain::{Response, ValidationError};

use crate::error::CallbackError;

/// Future returned by a registered callback.
pub type CallbackFuture = Pin<Box<dyn Future<Output = Result<(), CallbackError>> + Send>>;

/// A registered callback receiving `T`.
pub type Callback<T> = Arc<dyn Fn(T) -> CallbackFuture + Send + Sync>;

/// Payload of success callbacks.
#[derive(Debug, Clone)]
pub struct SuccessEvent {
    /// The cast result of an entity verb when present, otherwise the raw
    /// response data.
    pub data: Option<Value>,
    /// The response that triggered the event.
    pub response: Arc<Response>,
}

/// Payload of validation error callbacks.
#[derive(Debug, Clone)]
pub struct ValidationEvent {
    /// Fresh copy of the validation body with dotted keys expanded.
    pub error: ValidationError,
    /// The response that triggered the event.
    pub response: Arc<Response>,
}

/// The channels callbacks can be registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// 2xx
    Success,
    /// Statuses without a dedicated channel, and failed attempts
    Error,
    /// 422
    ValidationError,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// Any attempt that reached an outcome
    Finished,
    /// An attempt aborted through its cancellation token
    Cancelled,
}

impl EventKind {
    /// Every kind.
    pub const ALL: [Self; 7] = [
        Self::Success,
        Self::Error,
        Self::ValidationError,
        Self::Unauthorized,
        Self::Forbidden,
        Self::Finished,
        Self::Cancelled,
    ];
}

fn wrap<T, F, Fut>(callback: F) -> Callback<T>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
{
    Arc::new(move |payload| Box::pin(callback(payload)))
}

/// One owner's callbacks, one ordered list per [`EventKind`].
#[derive(Clone, Default)]
pub struct ResponseEvents {
    pub(crate) success: Vec<Callback<SuccessEvent>>,
    pub(crate) error: Vec<Callback<Arc<Response>>>,
    pub(crate) validation_error: Vec<Callback<ValidationEvent>>,
    pub(crate) unauthorized: Vec<Callback<Arc<Response>>>,
    pub(crate) forbidden: Vec<Callback<Arc<Response>>>,
    pub(crate) finished: Vec<Callback<Arc<Response>>>,
    pub(crate) cancelled: Vec<Callback<Arc<Response>>>,
}

impl ResponseEvents {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a success callback.
    pub fn add_on_success<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(SuccessEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.success.push(wrap(callback));
        self
    }

    /// Adds a generic error callback.
    pub fn add_on_error<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.error.push(wrap(callback));
        self
    }

    /// Adds a validation error callback.
    pub fn add_on_validation_error<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(ValidationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.validation_error.push(wrap(callback));
        self
    }

    /// Adds an unauthorized callback.
    pub fn add_on_unauthorized<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.unauthorized.push(wrap(callback));
        self
    }

    /// Adds a forbidden callback.
    pub fn add_on_forbidden<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.forbidden.push(wrap(callback));
        self
    }

    /// Adds a finished callback.
    pub fn add_on_finished<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.finished.push(wrap(callback));
        self
    }

    /// Adds a cancelled callback.
    pub fn add_on_cancelled<F, Fut>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.cancelled.push(wrap(callback));
        self
    }

    /// Removes every callback of one kind.
    pub fn clear(&mut self, kind: EventKind) -> &mut Self {
        match kind {
            EventKind::Success => self.success.clear(),
            EventKind::Error => self.error.clear(),
            EventKind::ValidationError => self.validation_error.clear(),
            EventKind::Unauthorized => self.unauthorized.clear(),
            EventKind::Forbidden => self.forbidden.clear(),
            EventKind::Finished => self.finished.clear(),
            EventKind::Cancelled => self.cancelled.clear(),
        }
        self
    }

    /// Removes every callback.
    pub fn clear_all(&mut self) -> &mut Self {
        for kind in EventKind::ALL {
            self.clear(kind);
        }
        self
    }

    /// Number of callbacks registered for one kind.
    #[must_use]
    pub fn len(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Success => self.success.len(),
            EventKind::Error => self.error.len(),
            EventKind::ValidationError => self.validation_error.len(),
            EventKind::Unauthorized => self.unauthorized.len(),
            EventKind::Forbidden => self.forbidden.len(),
            EventKind::Finished => self.finished.len(),
            EventKind::Cancelled => self.cancelled.len(),
        }
    }

    /// Returns whether no callback is registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        EventKind::ALL.into_iter().all(|kind| self.len(kind) == 0)
    }
}

impl fmt::Debug for ResponseEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            map.entry(&kind, &self.len(kind));
        }
        map.finish()
    }
}
