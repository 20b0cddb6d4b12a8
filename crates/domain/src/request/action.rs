//! Bulk action builder.

use serde_json::{Map, Value};

use super::filters::QueryComponent;
use crate::json::is_truthy;

/// A named backend action, optionally scoped to one record (`action`, `id`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    name: Option<String>,
    id: Value,
}

impl Action {
    /// Sets the action and the record it applies to.
    pub fn set(&mut self, name: impl Into<String>, id: Value) {
        self.name = Some(name.into());
        self.id = id;
    }
}

impl QueryComponent for Action {
    fn is_filled(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.is_empty())
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let Some(name) = self.name.as_ref().filter(|name| !name.is_empty()) else {
            return map;
        };
        map.insert("action".to_string(), Value::String(name.clone()));
        if is_truthy(&self.id) {
            map.insert("id".to_string(), self.id.clone());
        }
        map
    }
}
