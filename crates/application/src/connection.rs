//! One HTTP attempt at a time: URL resolution, headers, cancellation and
//! the running/cancelled/failed flags.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use restmodel_domain::{HttpMethod, RequestPayload, Response};

use crate::api::Api;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CancellationToken, TransportRequest};

#[derive(Debug, Default)]
struct ConnectionState {
    running: AtomicBool,
    cancelled: AtomicBool,
    failed: AtomicBool,
    token: Mutex<Option<CancellationToken>>,
}

/// Shareable handle used to cancel a connection from outside its owner.
#[derive(Debug, Clone, Default)]
pub struct ConnectionHandle(Arc<ConnectionState>);

impl ConnectionHandle {
    /// Aborts the running attempt. No-op when nothing is in flight.
    ///
    /// The connection only reports itself cancelled once the abort won the
    /// race against the transport.
    pub fn cancel(&self) {
        if !self.0.running.load(Ordering::SeqCst) {
            return;
        }
        if let Some(token) = self.0.token.lock().as_ref() {
            token.cancel();
        }
    }

    /// Returns whether an attempt is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.running.load(Ordering::SeqCst)
    }
}

/// Executes requests against the client's transport.
#[derive(Debug, Default)]
pub struct Connection {
    api: Option<Api>,
    handle: ConnectionHandle,
    headers: BTreeMap<String, String>,
}

impl Connection {
    /// Creates a connection bound to `api`.
    #[must_use]
    pub fn new(api: Option<Api>) -> Self {
        Self {
            api,
            ..Self::default()
        }
    }

    /// The client this connection sends through.
    #[must_use]
    pub const fn api(&self) -> Option<&Api> {
        self.api.as_ref()
    }

    /// Rebinds the connection to another client.
    pub fn set_api(&mut self, api: Api) {
        self.api = Some(api);
    }

    /// Sets a header sent only by this connection, overriding the client's.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Headers set on this connection only.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Handle for cancelling from elsewhere.
    #[must_use]
    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    /// Aborts the running attempt, if any.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Returns whether an attempt is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Returns whether the last attempt was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.handle.0.cancelled.load(Ordering::SeqCst)
    }

    /// Returns whether the last attempt failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.handle.0.failed.load(Ordering::SeqCst)
    }

    /// Sends a GET with `parameters` in the query string.
    ///
    /// # Errors
    ///
    /// See [`Connection::execute`].
    pub async fn get(
        &self,
        path: &str,
        parameters: Map<String, Value>,
    ) -> ApplicationResult<Response> {
        self.execute(HttpMethod::Get, path, RequestPayload::Query(parameters)).await
    }

    /// Sends a POST with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Connection::execute`].
    pub async fn post(&self, path: &str, payload: RequestPayload) -> ApplicationResult<Response> {
        self.execute(HttpMethod::Post, path, payload).await
    }

    /// Sends a PUT with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Connection::execute`].
    pub async fn put(&self, path: &str, payload: RequestPayload) -> ApplicationResult<Response> {
        self.execute(HttpMethod::Put, path, payload).await
    }

    /// Sends a DELETE without a body.
    ///
    /// # Errors
    ///
    /// See [`Connection::execute`].
    pub async fn delete(&self, path: &str) -> ApplicationResult<Response> {
        self.execute(HttpMethod::Delete, path, RequestPayload::Empty).await
    }

    /// Performs exactly one transport call and wraps its outcome.
    ///
    /// Error statuses and transport failures are not errors here; they are
    /// recorded on the returned [`Response`].
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::MissingClient`] when the connection has
    /// no client.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        payload: RequestPayload,
    ) -> ApplicationResult<Response> {
        let api = self.api.as_ref().ok_or(ApplicationError::MissingClient)?;
        let settings = api.settings();

        let path = if path.starts_with('/') || path.contains("://") {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let url = settings.resolve(&path);

        let mut headers = settings.headers;
        headers.extend(self.headers.clone());

        let state = &self.handle.0;
        let (token, mut receiver) = CancellationToken::pair();
        *state.token.lock() = Some(token);
        state.cancelled.store(false, Ordering::SeqCst);
        state.failed.store(false, Ordering::SeqCst);
        state.running.store(true, Ordering::SeqCst);

        debug!(method = %method, url = %url, "sending request");
        let transport = api.transport();
        let request = TransportRequest {
            method,
            url,
            payload,
            headers,
        };

        let outcome = tokio::select! {
            result = transport.send(request) => Some(result),
            () = receiver.cancelled() => None,
        };

        state.running.store(false, Ordering::SeqCst);
        state.token.lock().take();

        let response = match outcome {
            None => {
                debug!(method = %method, "request cancelled");
                state.cancelled.store(true, Ordering::SeqCst);
                Response::cancelled()
            }
            Some(Ok(reply)) => Response::completed(reply.status, reply.body),
            Some(Err(error)) => match error.status() {
                Some(status) => Response::completed(status, error.body().cloned().unwrap_or(Value::Null)),
                None => {
                    warn!(method = %method, error = %error, "transport failed without a response");
                    Response::failed()
                }
            },
        };
        state.failed.store(response.is_failed(), Ordering::SeqCst);
        Ok(response)
    }
}
