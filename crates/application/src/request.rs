//! One logical operation: body composition, deduplication, the transport
//! call and event dispatch.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use restmodel_domain::request::{append_query, multipart_fields};
use restmodel_domain::{
    DomainError, HttpMethod, QueryParameters, RequestPayload, Response, UploadFiles,
};

use crate::api::Api;
use crate::connection::Connection;
use crate::error::ApplicationResult;
use crate::events::{HasResponseEvents, ResponseDispatcher, ResponseEvents};
use crate::query_builder::QueryBuilder;

/// A configurable request bound to a client.
///
/// Each verb performs exactly one attempt, records the [`Response`],
/// dispatches it to the client's callbacks and then to this request's own,
/// and finally clears this request's callbacks.
#[derive(Debug)]
pub struct Request {
    id: Uuid,
    url: Option<String>,
    key: Option<String>,
    query: QueryParameters,
    events: ResponseEvents,
    connection: Connection,
    response: Option<Arc<Response>>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Clone for Request {
    /// Copies the configuration into a new request with its own identity
    /// and connection. The last response is not copied.
    fn clone(&self) -> Self {
        let mut connection = Connection::new(self.connection.api().cloned());
        for (name, value) in self.connection.headers() {
            connection.set_header(name.clone(), value.clone());
        }
        Self {
            id: Uuid::now_v7(),
            url: self.url.clone(),
            key: self.key.clone(),
            query: self.query.clone(),
            events: self.events.clone(),
            connection,
            response: None,
        }
    }
}

impl Request {
    /// Creates a request sending through `api`.
    #[must_use]
    pub fn new(api: Option<Api>) -> Self {
        Self {
            id: Uuid::now_v7(),
            url: None,
            key: None,
            query: QueryParameters::new(),
            events: ResponseEvents::new(),
            connection: Connection::new(api),
            response: None,
        }
    }

    /// Identity used by the in-flight registry.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Path relative to the client's base URL.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Sets the path.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    /// Deduplication key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Sets the deduplication key: issuing this request cancels any
    /// request still registered under the same key.
    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    /// The client, if bound.
    #[must_use]
    pub const fn api(&self) -> Option<&Api> {
        self.connection.api()
    }

    /// Binds the request to a client.
    pub fn set_api(&mut self, api: Api) -> &mut Self {
        self.connection.set_api(api);
        self
    }

    /// Sets a header for this request only.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.connection.set_header(name, value);
        self
    }

    /// The configured parameters.
    #[must_use]
    pub const fn query(&self) -> &QueryParameters {
        &self.query
    }

    /// Callbacks pending for the next attempt.
    #[must_use]
    pub const fn events(&self) -> &ResponseEvents {
        &self.events
    }

    /// The merged parameters the next verb sends.
    #[must_use]
    pub fn body_parameters(&self) -> Map<String, Value> {
        self.query.to_body()
    }

    /// The last recorded response.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        self.response.as_deref()
    }

    /// Returns whether an attempt is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.connection.is_running()
    }

    /// Aborts the running attempt; no-op when idle.
    pub fn cancel(&self) -> &Self {
        self.connection.cancel();
        self
    }

    /// Sends a GET with the parameters in the query string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn get(&mut self) -> ApplicationResult<&mut Self> {
        let url = self.target_url()?;
        let payload = RequestPayload::Query(self.body_parameters());
        self.run(HttpMethod::Get, &url, payload).await
    }

    /// Sends a POST with `data` merged under the parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn post(&mut self, data: Map<String, Value>) -> ApplicationResult<&mut Self> {
        let url = self.target_url()?;
        let payload = RequestPayload::Json(self.merged_body(data));
        self.run(HttpMethod::Post, &url, payload).await
    }

    /// Sends a PUT with `data` merged under the parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn put(&mut self, data: Map<String, Value>) -> ApplicationResult<&mut Self> {
        let url = self.target_url()?;
        let payload = RequestPayload::Json(self.merged_body(data));
        self.run(HttpMethod::Put, &url, payload).await
    }

    /// Sends a DELETE.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn delete(&mut self) -> ApplicationResult<&mut Self> {
        let url = self.target_url()?;
        self.run(HttpMethod::Delete, &url, RequestPayload::Empty).await
    }

    /// POSTs `files` and `data` as a multipart form. The parameters travel
    /// in the query string of `url`, or of the request's own path.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the first failing callback.
    pub async fn store_files(
        &mut self,
        files: &UploadFiles,
        data: Map<String, Value>,
        url: Option<&str>,
    ) -> ApplicationResult<&mut Self> {
        let base = match url {
            Some(url) => url.to_string(),
            None => self.target_url()?,
        };
        let url = append_query(&base, &self.body_parameters())?;
        let payload = RequestPayload::Multipart(multipart_fields(files, &data));
        self.run(HttpMethod::Post, &url, payload).await
    }

    async fn run(
        &mut self,
        method: HttpMethod,
        url: &str,
        payload: RequestPayload,
    ) -> ApplicationResult<&mut Self> {
        let response = self.send(method, url, payload).await?;
        self.trigger_response_events(response, None).await?;
        Ok(self)
    }

    fn target_url(&self) -> ApplicationResult<String> {
        self.url
            .clone()
            .ok_or_else(|| DomainError::EmptyUrl.into())
    }

    fn merged_body(&self, data: Map<String, Value>) -> Map<String, Value> {
        let mut body = data;
        body.extend(self.body_parameters());
        body
    }

    /// Registers under the key, performs the attempt and records the
    /// response. The registration is removed only when the attempt finished
    /// and the entry still belongs to this request.
    pub(crate) async fn send(
        &mut self,
        method: HttpMethod,
        url: &str,
        payload: RequestPayload,
    ) -> ApplicationResult<Arc<Response>> {
        if let (Some(api), Some(key)) = (self.connection.api(), self.key.as_deref()) {
            debug!(key, request = %self.id, "registering keyed request");
            api.cancel_running(key, self.id, self.connection.handle());
        }

        let response = Arc::new(self.connection.execute(method, url, payload).await?);
        self.response = Some(Arc::clone(&response));

        if let (Some(api), Some(key)) = (self.connection.api(), self.key.as_deref())
            && response.is_finished()
        {
            api.remove_request(key, self.id);
        }
        Ok(response)
    }

    /// Dispatches `response` to the client's callbacks, then this request's
    /// own, and clears the latter whatever the outcome.
    pub(crate) async fn trigger_response_events(
        &mut self,
        response: Arc<Response>,
        success_data: Option<Value>,
    ) -> ApplicationResult<()> {
        let mut dispatcher = ResponseDispatcher::new();
        if let Some(api) = self.connection.api() {
            dispatcher = dispatcher.add_response_events(api.events_snapshot());
        }
        let dispatcher = dispatcher
            .add_response_events(std::mem::take(&mut self.events))
            .with_success_data(success_data);
        dispatcher.dispatch(response).await?;
        Ok(())
    }
}

impl QueryBuilder for Request {
    fn query_mut(&mut self) -> &mut QueryParameters {
        &mut self.query
    }
}

impl HasResponseEvents for Request {
    fn response_events_mut(&mut self) -> &mut ResponseEvents {
        &mut self.events
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::{ApplicationError, CallbackError};
    use crate::events::EventKind;
    use crate::test_support::{Reply, api, object};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use restmodel_domain::{FileUpload, FormValue};
    use serde_json::json;

    #[tokio::test]
    async fn get_sends_parameters_in_query() {
        let (api, transport) = api();
        let mut request = api.request("/posts").unwrap();
        request.limit(10).where_eq("title", json!("Rust"));

        request.get().await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "https://api.test/v1/posts");
        assert_eq!(
            sent[0].payload,
            RequestPayload::Query(object(json!({
                "limit": 10,
                "wheres": [{"column": "title", "operator": "=", "value": "Rust"}]
            })))
        );
        assert_eq!(request.response().unwrap().status_code(), Some(200));
    }

    #[tokio::test]
    async fn post_merges_data_under_parameters() {
        let (api, transport) = api();
        let mut request = api.request("posts").unwrap();
        request.limit(3);

        request
            .post(object(json!({"title": "Hello", "limit": 99})))
            .await
            .unwrap();

        assert_eq!(
            transport.sent()[0].payload,
            RequestPayload::Json(object(json!({"title": "Hello", "limit": 3})))
        );
    }

    #[tokio::test]
    async fn delete_sends_no_body() {
        let (api, transport) = api();
        api.request("posts/4").unwrap().delete().await.unwrap();
        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Delete);
        assert_eq!(sent[0].payload, RequestPayload::Empty);
    }

    #[tokio::test]
    async fn store_files_uses_multipart_and_query_string() {
        let (api, transport) = api();
        let mut request = api.request("media").unwrap();
        request.with(["owner"]);
        let files = UploadFiles::new().file("file", FileUpload::new("a.txt", b"hi".to_vec()));

        request
            .store_files(&files, object(json!({"public": true})), None)
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "https://api.test/v1/media?with%5B0%5D=owner");
        let RequestPayload::Multipart(fields) = &sent[0].payload else {
            panic!("expected multipart payload");
        };
        assert_eq!(fields[0].name, "file");
        assert_eq!(fields[1].name, "public");
        assert_eq!(fields[1].value, FormValue::Text("1".to_string()));

        request.get().await.unwrap();
        assert!(matches!(transport.sent()[1].payload, RequestPayload::Query(_)));
    }

    #[tokio::test]
    async fn request_without_url_is_rejected() {
        let (api, _) = api();
        let mut request = Request::new(Some(api));
        let result = request.get().await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::EmptyUrl))
        ));
    }

    #[tokio::test]
    async fn request_callbacks_are_one_shot_client_callbacks_persist() {
        let (api, transport) = api();
        transport.respond(200, json!({"ok": true})).respond(200, json!({"ok": true}));
        let calls = Arc::new(Mutex::new(Vec::new()));

        let client_calls = Arc::clone(&calls);
        api.on_finished(move |_| {
            let calls = Arc::clone(&client_calls);
            async move {
                calls.lock().push("client");
                Ok(())
            }
        });

        let mut request = api.request("posts").unwrap();
        let request_calls = Arc::clone(&calls);
        request.on_success(move |event| {
            let calls = Arc::clone(&request_calls);
            async move {
                assert_eq!(event.data, Some(json!({"ok": true})));
                calls.lock().push("request");
                Ok(())
            }
        });

        request.get().await.unwrap();
        assert_eq!(*calls.lock(), vec!["request", "client"]);
        assert_eq!(request.events.len(EventKind::Success), 0);

        request.get().await.unwrap();
        assert_eq!(*calls.lock(), vec!["request", "client", "client"]);
    }

    #[tokio::test]
    async fn callback_failure_propagates_and_still_clears() {
        let (api, transport) = api();
        transport.respond(500, json!(null));
        let mut request = api.request("posts").unwrap();
        request.on_error(|response| async move {
            Err(CallbackError::new(format!(
                "status {:?}",
                response.status_code()
            )))
        });

        let result = request.get().await;
        assert!(matches!(result, Err(ApplicationError::Callback(ref e)) if e.message() == "status Some(500)"));
        assert!(request.events.is_empty());
        assert!(request.response().unwrap().is_failed());
    }

    #[tokio::test]
    async fn same_key_supersedes_the_running_request() {
        let (api, transport) = api();
        transport.push(Reply::Hang).respond(200, json!({"page": 2}));

        let mut first = api.request("posts").unwrap();
        first.set_key("posts.index");
        let mut second = api.request("posts").unwrap();
        second.set_key("posts.index");
        let second_id = second.id();

        let cancelled = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&cancelled);
        first.on_cancelled(move |_| {
            let flag = Arc::clone(&flag);
            async move {
                *flag.lock() = true;
                Ok(())
            }
        });

        let api_probe = api.clone();
        let (first_result, second_result) = tokio::join!(first.get(), async {
            tokio::task::yield_now().await;
            assert!(api_probe.is_running("posts.index"));
            let result = second.get().await.map(|_| ());
            assert_eq!(api_probe.registered_request("posts.index"), None);
            result
        });
        first_result.unwrap();
        second_result.unwrap();

        assert!(first.response().unwrap().is_cancelled());
        assert!(*cancelled.lock());
        assert!(second.response().unwrap().is_finished());
        assert_ne!(first.id(), second_id);
        assert!(api.in_flight_keys().is_empty());
    }

    #[tokio::test]
    async fn superseded_request_does_not_clobber_newer_registration() {
        let (api, transport) = api();
        transport.push(Reply::Hang).push(Reply::Hang);

        let mut first = api.request("search").unwrap();
        first.set_key("search");
        let mut second = api.request("search").unwrap();
        second.set_key("search");
        let second_handle = second.connection.handle();
        let second_id = second.id();

        let api_probe = api.clone();
        let (first_result, second_result) = tokio::join!(first.get(), async {
            tokio::task::yield_now().await;
            let pending = second.get();
            tokio::pin!(pending);
            let result = tokio::select! {
                biased;
                result = &mut pending => result.map(|_| ()),
                () = async {
                    tokio::task::yield_now().await;
                    assert_eq!(api_probe.registered_request("search"), Some(second_id));
                    assert_eq!(api_probe.in_flight_keys(), vec!["search"]);
                    second_handle.cancel();
                    std::future::pending::<()>().await;
                } => unreachable!(),
            };
            result
        });
        first_result.unwrap();
        second_result.unwrap();

        assert!(first.response().unwrap().is_cancelled());
        assert!(second.response().unwrap().is_cancelled());
        assert_eq!(api.registered_request("search"), Some(second_id));
        assert_eq!(api.registered_keys(), vec!["search"]);
        assert!(!api.is_running("search"));
        assert!(api.in_flight_keys().is_empty());
    }

    #[test]
    fn clone_gets_new_identity() {
        let (api, _) = api();
        let mut request = api.request("posts").unwrap();
        request.set_key("k").limit(2);
        let copy = request.clone();
        assert_ne!(copy.id(), request.id());
        assert_eq!(copy.body_parameters(), request.body_parameters());
        assert_eq!(copy.key(), Some("k"));
        assert!(copy.response().is_none());
    }
}
