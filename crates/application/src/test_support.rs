//! Scripted transport double shared by unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use restmodel_domain::ClientSettings;

use crate::api::Api;
use crate::ports::{Transport, TransportError, TransportRequest, TransportResponse};

pub enum Reply {
    Respond(u16, Value),
    Fail(TransportError),
    Hang,
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn push(&self, reply: Reply) -> &Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.push(Reply::Respond(status, body))
    }

    pub fn sent(&self) -> Vec<TransportRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().push(request);
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Reply::Respond(status, body)) => Ok(TransportResponse::new(status, body)),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(TransportResponse::new(200, Value::Null)),
        }
    }
}

pub fn api() -> (Api, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::default());
    let api = Api::new(
        Arc::clone(&transport) as Arc<dyn Transport>,
        ClientSettings::new("https://api.test").with_suffix("v1"),
    );
    (api, transport)
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
