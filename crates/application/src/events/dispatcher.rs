//! Classification of one response and fan-out to aggregated registries.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use restmodel_domain::json::is_truthy;
use restmodel_domain::{Response, ResponseOutcome, ValidationPayload};

use super::registry::{Callback, ResponseEvents, SuccessEvent, ValidationEvent};
use crate::error::CallbackError;

/// A one-shot aggregation of registries for a single completed response.
///
/// Registries are consulted in the order they were added; within one kind
/// every matched callback runs concurrently.
#[derive(Debug, Default)]
pub struct ResponseDispatcher {
    registries: Vec<ResponseEvents>,
    success_data: Option<Value>,
}

impl ResponseDispatcher {
    /// Creates a dispatcher without registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a registry after the ones already added.
    #[must_use]
    pub fn add_response_events(mut self, events: ResponseEvents) -> Self {
        self.registries.push(events);
        self
    }

    /// Sets the value success callbacks receive in preference to the raw
    /// response data.
    #[must_use]
    pub fn with_success_data(mut self, data: Option<Value>) -> Self {
        self.success_data = data;
        self
    }

    /// Classifies `response` and runs every matching callback.
    ///
    /// The primary channel fires first, then `finished` and `cancelled`
    /// when the response carries those flags.
    ///
    /// # Errors
    ///
    /// Returns the first callback failure of the first kind that had one.
    /// Callbacks of that kind still all run to completion.
    pub async fn dispatch(&self, response: Arc<Response>) -> Result<(), CallbackError> {
        let outcome = response.outcome();
        debug!(
            status = ?response.status_code(),
            outcome = outcome.as_str(),
            finished = response.is_finished(),
            cancelled = response.is_cancelled(),
            "dispatching response events"
        );

        match outcome {
            ResponseOutcome::Success => {
                let event = SuccessEvent {
                    data: self.success_payload(&response),
                    response: Arc::clone(&response),
                };
                run(self.collect(|events| &events.success), event).await?;
            }
            ResponseOutcome::Unauthorized => {
                run(self.collect(|events| &events.unauthorized), Arc::clone(&response)).await?;
            }
            ResponseOutcome::Forbidden => {
                run(self.collect(|events| &events.forbidden), Arc::clone(&response)).await?;
            }
            ResponseOutcome::ValidationError => {
                let error = response
                    .validation()
                    .map_or_else(|| ValidationPayload::default().to_error(), ValidationPayload::to_error);
                let event = ValidationEvent {
                    error,
                    response: Arc::clone(&response),
                };
                run(self.collect(|events| &events.validation_error), event).await?;
            }
            ResponseOutcome::Error => {
                run(self.collect(|events| &events.error), Arc::clone(&response)).await?;
            }
        }

        if response.is_finished() {
            run(self.collect(|events| &events.finished), Arc::clone(&response)).await?;
        }
        if response.is_cancelled() {
            run(self.collect(|events| &events.cancelled), Arc::clone(&response)).await?;
        }
        Ok(())
    }

    fn success_payload(&self, response: &Response) -> Option<Value> {
        self.success_data
            .iter()
            .chain(response.data())
            .find(|value| is_truthy(value))
            .cloned()
    }

    fn collect<T>(&self, select: impl Fn(&ResponseEvents) -> &Vec<Callback<T>>) -> Vec<Callback<T>> {
        self.registries
            .iter()
            .flat_map(|events| select(events).iter().cloned())
            .collect()
    }
}

async fn run<T: Clone>(callbacks: Vec<Callback<T>>, payload: T) -> Result<(), CallbackError> {
    if callbacks.is_empty() {
        return Ok(());
    }
    let results = join_all(callbacks.iter().map(|callback| callback(payload.clone()))).await;
    for result in results {
        if let Err(error) = result {
            warn!(error = %error, "response callback failed");
            return Err(error);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log) -> ResponseEvents {
        let mut events = ResponseEvents::new();
        let l = Arc::clone(log);
        events.add_on_success(move |event| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push(format!("success:{}", event.data.unwrap_or(Value::Null)));
                Ok(())
            }
        });
        let l = Arc::clone(log);
        events.add_on_error(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("error".to_string());
                Ok(())
            }
        });
        let l = Arc::clone(log);
        events.add_on_validation_error(move |event| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push(format!("validation:{}", event.error.errors));
                Ok(())
            }
        });
        let l = Arc::clone(log);
        events.add_on_unauthorized(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("unauthorized".to_string());
                Ok(())
            }
        });
        let l = Arc::clone(log);
        events.add_on_forbidden(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("forbidden".to_string());
                Ok(())
            }
        });
        let l = Arc::clone(log);
        events.add_on_finished(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("finished".to_string());
                Ok(())
            }
        });
        let l = Arc::clone(log);
        events.add_on_cancelled(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("cancelled".to_string());
                Ok(())
            }
        });
        events
    }

    async fn dispatch(response: Response) -> Vec<String> {
        let log = Log::default();
        ResponseDispatcher::new()
            .add_response_events(recording(&log))
            .dispatch(Arc::new(response))
            .await
            .unwrap();
        let entries = log.lock().clone();
        entries
    }

    #[tokio::test]
    async fn success_fires_success_and_finished_only() {
        let log = dispatch(Response::completed(200, json!({"id": 1}))).await;
        assert_eq!(log, vec![r#"success:{"id":1}"#, "finished"]);
    }

    #[tokio::test]
    async fn dedicated_status_channels() {
        assert_eq!(
            dispatch(Response::completed(401, json!(null))).await,
            vec!["unauthorized", "finished"]
        );
        assert_eq!(
            dispatch(Response::completed(403, json!(null))).await,
            vec!["forbidden", "finished"]
        );
        assert_eq!(
            dispatch(Response::completed(500, json!(null))).await,
            vec!["error", "finished"]
        );
        assert_eq!(dispatch(Response::failed()).await, vec!["error", "finished"]);
    }

    #[tokio::test]
    async fn validation_receives_expanded_errors() {
        let response = Response::completed(
            422,
            json!({"message": "Invalid", "errors": {"items.0.name": ["required"]}}),
        );
        let log = dispatch(response).await;
        assert_eq!(
            log,
            vec![r#"validation:{"items":[{"name":["required"]}]}"#, "finished"]
        );
    }

    #[tokio::test]
    async fn cancelled_fires_error_and_cancelled() {
        let log = dispatch(Response::cancelled()).await;
        assert_eq!(log, vec!["error", "cancelled"]);
    }

    #[tokio::test]
    async fn success_data_takes_precedence() {
        let log = Log::default();
        ResponseDispatcher::new()
            .add_response_events(recording(&log))
            .with_success_data(Some(json!([{"title": "cast"}])))
            .dispatch(Arc::new(Response::completed(200, json!({"raw": true}))))
            .await
            .unwrap();
        assert_eq!(log.lock()[0], r#"success:[{"title":"cast"}]"#);
    }

    #[tokio::test]
    async fn callbacks_of_one_kind_run_concurrently() {
        let notify = Arc::new(tokio::sync::Notify::new());
        let mut events = ResponseEvents::new();
        let waiter = Arc::clone(&notify);
        events.add_on_success(move |_| {
            let waiter = Arc::clone(&waiter);
            async move {
                waiter.notified().await;
                Ok(())
            }
        });
        let signaller = Arc::clone(&notify);
        events.add_on_success(move |_| {
            let signaller = Arc::clone(&signaller);
            async move {
                signaller.notify_one();
                Ok(())
            }
        });

        let dispatched = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            ResponseDispatcher::new()
                .add_response_events(events)
                .dispatch(Arc::new(Response::completed(200, json!(null)))),
        )
        .await;
        assert!(matches!(dispatched, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn failing_kind_still_completes_its_other_callbacks() {
        let log = Log::default();
        let mut events = ResponseEvents::new();
        events.add_on_error(|_| async { Err(CallbackError::new("first failed")) });
        let l = Arc::clone(&log);
        events.add_on_error(move |_| {
            let l = Arc::clone(&l);
            async move {
                tokio::task::yield_now().await;
                l.lock().push("second finished".to_string());
                Ok(())
            }
        });
        let l = Arc::clone(&log);
        events.add_on_finished(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("finished".to_string());
                Ok(())
            }
        });

        let result = ResponseDispatcher::new()
            .add_response_events(events)
            .dispatch(Arc::new(Response::completed(500, json!(null))))
            .await;

        assert_eq!(result, Err(CallbackError::new("first failed")));
        assert_eq!(*log.lock(), vec!["second finished"]);
    }

    #[tokio::test]
    async fn registries_run_in_order_and_errors_propagate() {
        let log = Log::default();
        let mut client = ResponseEvents::new();
        let l = Arc::clone(&log);
        client.add_on_finished(move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("client".to_string());
                Ok(())
            }
        });
        let mut request = ResponseEvents::new();
        request.add_on_success(|_| async { Err(CallbackError::new("boom")) });

        let result = ResponseDispatcher::new()
            .add_response_events(client)
            .add_response_events(request)
            .dispatch(Arc::new(Response::completed(200, json!(null))))
            .await;

        assert_eq!(result, Err(CallbackError::new("boom")));
        assert!(log.lock().is_empty());
    }
}
