//! The client: transport, settings, client-scoped callbacks and the
//! registry of keyed in-flight requests.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use restmodel_domain::{ClientSettings, DomainError, DomainResult, Response};

use crate::batch::Batch;
use crate::connection::ConnectionHandle;
use crate::error::CallbackError;
use crate::events::{EventKind, ResponseEvents, SuccessEvent, ValidationEvent};
use crate::ports::Transport;
use crate::request::Request;

const AUTHORIZATION: &str = "Authorization";
const CSRF_TOKEN: &str = "X-CSRF-TOKEN";

struct InFlight {
    request_id: Uuid,
    handle: ConnectionHandle,
}

struct ApiInner {
    transport: Arc<dyn Transport>,
    settings: RwLock<ClientSettings>,
    events: Mutex<ResponseEvents>,
    requests: Mutex<HashMap<String, InFlight>>,
}

/// Client shared by every request it creates. Cloning is cheap and
/// yields a handle to the same client.
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("settings", &*self.inner.settings.read())
            .field("in_flight", &self.in_flight_keys())
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Creates a client sending through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, settings: ClientSettings) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                transport,
                settings: RwLock::new(settings),
                events: Mutex::new(ResponseEvents::new()),
                requests: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Snapshot of the current settings.
    #[must_use]
    pub fn settings(&self) -> ClientSettings {
        self.inner.settings.read().clone()
    }

    /// Creates a request for `uri`, relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyUrl`] for an empty `uri`.
    pub fn request(&self, uri: &str) -> DomainResult<Request> {
        if uri.is_empty() {
            return Err(DomainError::EmptyUrl);
        }
        let uri = if uri.starts_with('/') {
            uri.to_string()
        } else {
            format!("/{uri}")
        };
        let mut request = Request::new(Some(self.clone()));
        request.set_url(uri);
        Ok(request)
    }

    /// Groups requests so one verb can run across all of them.
    #[must_use]
    pub fn batch<'a>(&self, requests: Vec<&'a mut Request>) -> Batch<'a> {
        Batch::new(requests)
    }

    /// Sets the host.
    pub fn host(&self, host: impl Into<String>) -> &Self {
        self.inner.settings.write().host = host.into();
        self
    }

    /// Sets the path suffix; a leading `/` is added when missing.
    pub fn suffix(&self, suffix: impl Into<String>) -> &Self {
        let mut settings = self.inner.settings.write();
        *settings = std::mem::take(&mut *settings).with_suffix(suffix);
        self
    }

    /// Sets a header sent with every request.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.inner
            .settings
            .write()
            .headers
            .insert(name.into(), value.into());
        self
    }

    /// Removes a header.
    pub fn remove_header(&self, name: &str) -> &Self {
        self.inner.settings.write().headers.remove(name);
        self
    }

    /// Sends `Authorization: Bearer {token}` with every request.
    pub fn set_bearer(&self, token: &str) -> &Self {
        self.set_header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Stops sending the bearer token.
    pub fn reset_bearer(&self) -> &Self {
        self.remove_header(AUTHORIZATION)
    }

    /// Sends `X-CSRF-TOKEN` with every request.
    pub fn set_csrf(&self, token: impl Into<String>) -> &Self {
        self.set_header(CSRF_TOKEN, token)
    }

    /// Stops sending the CSRF token.
    pub fn reset_csrf(&self) -> &Self {
        self.remove_header(CSRF_TOKEN)
    }

    /// Client-scoped success callback; persists across requests.
    pub fn on_success<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(SuccessEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_success(callback);
        self
    }

    /// Client-scoped error callback.
    pub fn on_error<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_error(callback);
        self
    }

    /// Client-scoped validation error callback.
    pub fn on_validation_error<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(ValidationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_validation_error(callback);
        self
    }

    /// Client-scoped unauthorized callback.
    pub fn on_unauthorized<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_unauthorized(callback);
        self
    }

    /// Client-scoped forbidden callback.
    pub fn on_forbidden<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_forbidden(callback);
        self
    }

    /// Client-scoped finished callback.
    pub fn on_finished<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_finished(callback);
        self
    }

    /// Client-scoped cancelled callback.
    pub fn on_cancelled<F, Fut>(&self, callback: F) -> &Self
    where
        F: Fn(Arc<Response>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.inner.events.lock().add_on_cancelled(callback);
        self
    }

    /// Clears the client-scoped callbacks of one kind.
    pub fn clear_callbacks(&self, kind: EventKind) -> &Self {
        self.inner.events.lock().clear(kind);
        self
    }

    /// Clears every client-scoped callback.
    pub fn clear_all_callbacks(&self) -> &Self {
        self.inner.events.lock().clear_all();
        self
    }

    /// Cancels every registered request and empties the registry.
    pub fn cancel_requests(&self) -> &Self {
        let drained: Vec<InFlight> = self
            .inner
            .requests
            .lock()
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        debug!(count = drained.len(), "cancelling registered requests");
        for entry in drained {
            entry.handle.cancel();
        }
        self
    }

    /// Returns whether the request registered under `key` is in flight.
    #[must_use]
    pub fn is_running(&self, key: &str) -> bool {
        self.inner
            .requests
            .lock()
            .get(key)
            .is_some_and(|entry| entry.handle.is_running())
    }

    /// Id of the request registered under `key`.
    #[must_use]
    pub fn registered_request(&self, key: &str) -> Option<Uuid> {
        self.inner
            .requests
            .lock()
            .get(key)
            .map(|entry| entry.request_id)
    }

    /// Keys whose registered request still has an attempt running, sorted.
    ///
    /// A request that ended cancelled stays registered but is not listed.
    #[must_use]
    pub fn in_flight_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .requests
            .lock()
            .iter()
            .filter(|(_, entry)| entry.handle.is_running())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Keys with a registered request, running or not, sorted.
    #[must_use]
    pub fn registered_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.requests.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Registers `request_id` under `key`, cancelling the request it
    /// replaces.
    pub(crate) fn cancel_running(&self, key: &str, request_id: Uuid, handle: ConnectionHandle) {
        let previous = self
            .inner
            .requests
            .lock()
            .insert(key.to_string(), InFlight { request_id, handle });
        if let Some(previous) = previous.filter(|entry| entry.request_id != request_id) {
            debug!(key, superseded = %previous.request_id, by = %request_id, "superseding keyed request");
            previous.handle.cancel();
        }
    }

    /// Removes the registration under `key` if it still belongs to
    /// `request_id`.
    pub(crate) fn remove_request(&self, key: &str, request_id: Uuid) {
        let mut requests = self.inner.requests.lock();
        if requests
            .get(key)
            .is_some_and(|entry| entry.request_id == request_id)
        {
            requests.remove(key);
        }
    }

    pub(crate) fn events_snapshot(&self) -> ResponseEvents {
        self.inner.events.lock().clone()
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.inner.transport)
    }
}
