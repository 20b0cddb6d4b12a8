//! End-to-end request and entity flows against a scripted transport.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

use restmodel_application::{
    Api, CallbackError, Entity, HasResponseEvents, Model, QueryBuilder, Transport, TransportError,
    TransportRequest, TransportResponse,
};
use restmodel_domain::{Cast, ClientSettings, PropertyDeclaration, Schema};

#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    sent: Mutex<Vec<TransportRequest>>,
}

impl Script {
    fn reply(&self, status: u16, body: Value) {
        self.replies
            .lock()
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    fn fail(&self, error: TransportError) {
        self.replies.lock().push_back(Err(error));
    }
}

#[async_trait]
impl Transport for Script {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(204, Value::Null)))
    }
}

fn client() -> (Api, Arc<Script>) {
    let script = Arc::new(Script::default());
    let api = Api::new(
        Arc::clone(&script) as Arc<dyn Transport>,
        ClientSettings::new("https://shop.test").with_suffix("api"),
    );
    (api, script)
}

static CATEGORY: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("Category")
        .endpoint("/categories")
        .attribute(PropertyDeclaration::new("id"))
        .attribute(PropertyDeclaration::new("name"))
        .build()
        .unwrap()
});

static ARTICLE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("Article")
        .endpoint("/articles")
        .attribute(PropertyDeclaration::new("id").cast(Cast::Integer))
        .attribute(PropertyDeclaration::new("title"))
        .attribute(PropertyDeclaration::new("inStock").cast(Cast::Boolean).default(json!(false)))
        .count(PropertyDeclaration::new("reviews"))
        .relation(PropertyDeclaration::new("category").cast(Cast::Entity(category)))
        .build()
        .unwrap()
});

fn category() -> &'static Schema {
    &CATEGORY
}

struct Article(Model);

impl Entity for Article {
    fn schema() -> &'static Schema {
        &ARTICLE
    }

    fn from_model(model: Model) -> Self {
        Self(model)
    }

    fn model(&self) -> &Model {
        &self.0
    }

    fn model_mut(&mut self) -> &mut Model {
        &mut self.0
    }
}

#[tokio::test]
async fn entity_index_then_update() {
    let (api, script) = client();
    script.reply(
        200,
        json!({"items": [
            {"id": "4", "title": "Lamp", "in_stock": 1, "reviews_count": 3,
             "category": {"id": 2, "name": "Lighting"}}
        ]}),
    );
    script.reply(200, json!({"id": 4, "title": "Desk lamp", "in_stock": true}));

    let mut query = Article::new(api.clone());
    query.0.where_eq("category.name", json!("Lighting")).with(["category"]);
    let mut articles = query.index().await.unwrap().unwrap();
    let mut lamp = articles.remove(0);

    assert_eq!(lamp.model().value("id"), json!(4));
    assert_eq!(lamp.model().value("inStock"), json!(true));
    assert_eq!(lamp.model().count("reviews"), Some(3));
    assert_eq!(
        lamp.model().entity("category").unwrap().value("name"),
        json!("Lighting")
    );

    lamp.model_mut().set("title", json!("Desk lamp")).unwrap();
    let updated = lamp.save(Map::new()).await.unwrap().unwrap();
    assert_eq!(updated.model().value("title"), json!("Desk lamp"));

    let sent = script.sent.lock().clone();
    assert_eq!(sent[0].url, "https://shop.test/api/articles/index");
    assert_eq!(sent[1].url, "https://shop.test/api/articles/4");
    assert_eq!(
        serde_json::to_value(match &sent[1].payload {
            restmodel_domain::RequestPayload::Json(body) => body.clone(),
            other => panic!("unexpected payload {other:?}"),
        })
        .unwrap(),
        json!({"id": 4, "title": "Desk lamp", "in_stock": true})
    );
}

#[tokio::test]
async fn validation_errors_reach_request_and_client() {
    let (api, script) = client();
    script.fail(TransportError::Status {
        status: 422,
        body: json!({"message": "The given data was invalid.", "errors": {"lines.0.qty": ["too low"]}}),
    });
    let seen = Arc::new(Mutex::new(Vec::new()));

    let client_seen = Arc::clone(&seen);
    api.on_validation_error(move |event| {
        let seen = Arc::clone(&client_seen);
        async move {
            seen.lock().push(format!("client:{}", event.error.message));
            Ok(())
        }
    });

    let mut request = api.request("orders").unwrap();
    let request_seen = Arc::clone(&seen);
    request.on_validation_error(move |event| {
        let seen = Arc::clone(&request_seen);
        async move {
            assert_eq!(event.error.messages("lines.0.qty"), vec!["too low"]);
            seen.lock().push("request".to_string());
            Ok(())
        }
    });

    request.post(Map::new()).await.unwrap();

    assert_eq!(
        *seen.lock(),
        vec!["client:The given data was invalid.", "request"]
    );
    let response = request.response().unwrap();
    assert!(response.is_failed());
    assert_eq!(
        response.validation().unwrap().errors.get("lines.0.qty"),
        Some(&json!(["too low"]))
    );
}

#[tokio::test]
async fn unauthorized_and_timeouts_use_their_channels() {
    let (api, script) = client();
    script.reply(401, json!({"message": "Unauthenticated."}));
    script.fail(TransportError::Timeout { timeout_ms: 100 });
    let channels = Arc::new(Mutex::new(Vec::new()));

    for (name, register) in [("unauthorized", 0), ("error", 1)] {
        let channels = Arc::clone(&channels);
        let push = move |_| {
            let channels = Arc::clone(&channels);
            async move {
                channels.lock().push(name);
                Ok::<(), CallbackError>(())
            }
        };
        if register == 0 {
            api.on_unauthorized(push);
        } else {
            api.on_error(push);
        }
    }

    api.request("me").unwrap().get().await.unwrap();
    api.request("me").unwrap().get().await.unwrap();

    assert_eq!(*channels.lock(), vec!["unauthorized", "error"]);
}

#[tokio::test]
async fn callback_failure_reaches_the_caller() {
    let (api, script) = client();
    script.reply(200, json!({"ok": true}));
    let mut request = api.request("ping").unwrap();
    request.on_success(|_| async { Err(CallbackError::new("handler rejected")) });

    let error = request.get().await.unwrap_err();
    assert_eq!(error.to_string(), "callback failed: handler rejected");
}
